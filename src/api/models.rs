use serde::{Deserialize, Serialize};

use crate::models::SearchKeyState;

#[derive(Deserialize)]
pub struct KeyQuery {
    #[serde(default)]
    pub query: String,
}

#[derive(Deserialize)]
pub struct FilterQuery {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub term: String,
}

#[derive(Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: String,
}

#[derive(Deserialize)]
pub struct DismissRequest {
    #[serde(default)]
    pub query: String,
    pub id: String,
}

#[derive(Serialize)]
pub struct ResultsResponse {
    #[serde(rename = "search_key")]
    pub key: String,
    #[serde(flatten)]
    pub state: SearchKeyState,
}

#[derive(Serialize)]
pub struct DismissResponse {
    #[serde(rename = "search_key")]
    pub key: String,
    pub removed: usize,
    #[serde(flatten)]
    pub state: SearchKeyState,
}
