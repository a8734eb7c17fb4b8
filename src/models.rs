use serde::{Deserialize, Deserializer, Serialize};

/// The query text captured when a request was issued.
pub type SearchKey = String;

/// One story (or comment) returned by the search endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultItem {
    pub id: String,
    pub title: String,
    pub url: String,
    pub author: String,
    pub comment_count: i64,
    pub points: i64,
}

/// One batch of results as returned by a single fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultPage {
    pub items: Vec<ResultItem>,
    pub page_index: u32,
}

/// Everything accumulated so far for one search key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchKeyState {
    pub items: Vec<ResultItem>,
    pub page_index: u32,
}

/// Raw `/search` response body.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    hits: Vec<Hit>,
    page: u32,
}

// Comment hits come back with null title/url/points, so everything except
// the id is lenient.
#[derive(Debug, Deserialize)]
pub(crate) struct Hit {
    #[serde(rename = "objectID")]
    object_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    author: String,
    #[serde(default, deserialize_with = "null_as_default")]
    num_comments: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    points: i64,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl From<Hit> for ResultItem {
    fn from(hit: Hit) -> Self {
        ResultItem {
            id: hit.object_id,
            title: hit.title,
            url: hit.url,
            author: hit.author,
            comment_count: hit.num_comments,
            points: hit.points,
        }
    }
}

impl From<SearchResponse> for ResultPage {
    fn from(response: SearchResponse) -> Self {
        ResultPage {
            items: response.hits.into_iter().map(ResultItem::from).collect(),
            page_index: response.page,
        }
    }
}

impl ResultPage {
    /// Decodes a raw response body into a page.
    pub fn from_json(body: &str) -> crate::error::Result<Self> {
        let response: SearchResponse = serde_json::from_str(body)?;
        Ok(response.into())
    }
}
