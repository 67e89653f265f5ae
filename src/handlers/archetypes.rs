use axum::Json;

use crate::analysis::{all_archetypes, ArchetypeData};

pub async fn list_archetypes() -> Json<Vec<ArchetypeData>> {
    Json(all_archetypes())
}
