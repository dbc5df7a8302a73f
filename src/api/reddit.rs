// src/api/reddit.rs

//! Reddit implementation of [`ForumApi`].
//!
//! Uses application-only OAuth (client credentials). The bearer token is
//! fetched on first use and kept for the rest of the run.

use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::OnceCell;
use url::Url;

use super::ForumApi;
use crate::error::{AppError, Result};
use crate::models::{
    ApiConfig, Comment, CommentForest, CommentNode, MoreComments, Post, SearchSort, TimeRange,
};
use crate::utils::http;

/// Maximum comment ids accepted by one `morechildren` call.
const MORE_CHILDREN_BATCH: usize = 100;

/// API credentials for a Reddit "script" or "web" app.
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,

    /// Overrides `api.user_agent` when set
    pub user_agent: Option<String>,
}

impl Credentials {
    /// Read `REDDIT_ID`, `REDDIT_SECRET` and optional `REDDIT_UA`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            value(key).ok_or_else(|| AppError::config(format!("{key} is not set")))
        };

        Ok(Self {
            client_id: required("REDDIT_ID")?,
            client_secret: required("REDDIT_SECRET")?,
            user_agent: value("REDDIT_UA"),
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Read-only Reddit API client.
pub struct RedditClient {
    client: Client,
    credentials: Credentials,
    auth_url: Url,
    api_url: String,
    page_size: usize,
    token: OnceCell<String>,
}

impl RedditClient {
    pub fn new(config: &ApiConfig, credentials: Credentials) -> Result<Self> {
        let user_agent = credentials
            .user_agent
            .clone()
            .unwrap_or_else(|| config.user_agent.clone());
        let client = http::create_client(&user_agent, config.timeout_secs)?;

        Ok(Self {
            client,
            credentials,
            auth_url: Url::parse(&config.auth_url)?,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            page_size: config.page_size.clamp(1, 100),
            token: OnceCell::new(),
        })
    }

    async fn token(&self) -> Result<&str> {
        self.token
            .get_or_try_init(|| self.fetch_token())
            .await
            .map(String::as_str)
    }

    async fn fetch_token(&self) -> Result<String> {
        log::debug!("Requesting application token from {}", self.auth_url);
        let text = self
            .client
            .post(self.auth_url.clone())
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let token: TokenResponse = serde_json::from_str(&text)?;
        match token.access_token {
            Some(access_token) if !access_token.is_empty() => Ok(access_token),
            _ => Err(AppError::config(format!(
                "token request rejected: {}",
                token.error.unwrap_or_else(|| "no access_token".to_string())
            ))),
        }
    }

    /// Authenticated GET returning the response body.
    async fn get(&self, path: &str, params: &[(&str, String)]) -> Result<String> {
        let token = self.token().await?;
        let mut url = Url::parse(&format!("{}/{}", self.api_url, path))?;
        url.query_pairs_mut()
            .append_pair("raw_json", "1")
            .extend_pairs(params);

        log::debug!("GET {}", url);
        let text = self
            .client
            .get(url)
            .bearer_auth(token)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(text)
    }

    /// Follow `after` cursors until `limit` posts or the end of the listing.
    async fn collect_listing(
        &self,
        path: &str,
        params: &[(&str, String)],
        limit: usize,
    ) -> Result<Vec<Post>> {
        let mut posts = Vec::new();
        let mut after: Option<String> = None;

        while posts.len() < limit {
            let mut query = params.to_vec();
            query.push(("limit", self.page_size.min(limit - posts.len()).to_string()));
            if let Some(cursor) = &after {
                query.push(("after", cursor.clone()));
            }

            let page = parse_listing(&self.get(path, &query).await?)?;
            let fetched = page.posts.len();
            posts.extend(page.posts);

            match page.after {
                Some(next) if fetched > 0 => after = Some(next),
                _ => break,
            }
        }

        posts.truncate(limit);
        Ok(posts)
    }
}

#[async_trait]
impl ForumApi for RedditClient {
    async fn search(
        &self,
        forum: &str,
        query: &str,
        sort: SearchSort,
        time_range: TimeRange,
        limit: usize,
    ) -> Result<Vec<Post>> {
        let params = [
            ("q", format!("({query})")),
            ("restrict_sr", "on".to_string()),
            ("sort", sort.as_str().to_string()),
            ("t", time_range.as_str().to_string()),
        ];
        self.collect_listing(&format!("r/{forum}/search"), &params, limit)
            .await
    }

    async fn list_recent(&self, forum: &str, limit: usize) -> Result<Vec<Post>> {
        self.collect_listing(&format!("r/{forum}/new"), &[], limit)
            .await
    }

    async fn load(&self, post: &mut Post) -> Result<()> {
        let text = self.get(&format!("comments/{}", post.id), &[]).await?;
        let (loaded, comments) = parse_thread(&text)?;
        if let Some(loaded) = loaded {
            post.title = loaded.title;
            post.body = loaded.body;
            post.score = loaded.score;
        }
        post.comments = comments;
        Ok(())
    }

    async fn expand_comments(&self, post: &mut Post, limit: usize) -> Result<()> {
        let mut expanded = 0;

        while expanded < limit {
            let Some(mut more) = post.comments.take_more() else {
                break;
            };
            // "Continue this thread" links carry no ids to expand.
            if more.children.is_empty() {
                continue;
            }

            if more.children.len() > MORE_CHILDREN_BATCH {
                let rest = more.children.split_off(MORE_CHILDREN_BATCH);
                post.comments.attach(CommentNode::More(MoreComments {
                    children: rest,
                    ..more.clone()
                }));
            }

            let params = [
                ("api_type", "json".to_string()),
                ("link_id", post.fullname()),
                ("children", more.children.join(",")),
            ];
            let text = self.get("api/morechildren", &params).await?;
            for node in parse_more_children(&text)? {
                post.comments.attach(node);
            }
            expanded += 1;
        }

        log::debug!(
            "Expanded {} placeholder(s) for post {}; {} left",
            expanded,
            post.id,
            post.comments.more_count()
        );
        Ok(())
    }
}

// --- Wire format ---

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Thing>,
    #[serde(default)]
    after: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Thing {
    kind: String,
    data: Value,
}

#[derive(Debug, Deserialize)]
struct LinkData {
    id: String,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    selftext: String,
}

#[derive(Debug, Deserialize)]
struct CommentData {
    id: String,
    #[serde(default)]
    parent_id: String,
    #[serde(default)]
    body: String,
    #[serde(default)]
    depth: usize,
    /// Either an empty string or a nested listing
    #[serde(default)]
    replies: Value,
}

#[derive(Debug, Deserialize)]
struct MoreData {
    id: String,
    #[serde(default)]
    parent_id: String,
    #[serde(default)]
    children: Vec<String>,
    #[serde(default)]
    depth: usize,
}

#[derive(Debug, Deserialize)]
struct MoreChildrenResponse {
    json: MoreChildrenBody,
}

#[derive(Debug, Deserialize)]
struct MoreChildrenBody {
    #[serde(default)]
    errors: Vec<Value>,
    #[serde(default)]
    data: Option<MoreChildrenData>,
}

#[derive(Debug, Deserialize)]
struct MoreChildrenData {
    #[serde(default)]
    things: Vec<Thing>,
}

/// One page of posts.
#[derive(Debug)]
struct PostPage {
    posts: Vec<Post>,
    after: Option<String>,
}

fn link_to_post(data: Value) -> Result<Post> {
    let link: LinkData = serde_json::from_value(data)?;
    Ok(Post {
        id: link.id,
        score: link.score,
        title: link.title,
        body: link.selftext,
        comments: CommentForest::default(),
    })
}

fn parse_listing(text: &str) -> Result<PostPage> {
    let listing: Listing = serde_json::from_str(text)?;
    let posts = listing
        .data
        .children
        .into_iter()
        .filter(|thing| thing.kind == "t3")
        .map(|thing| link_to_post(thing.data))
        .collect::<Result<Vec<_>>>()?;
    Ok(PostPage {
        posts,
        after: listing.data.after.filter(|a| !a.is_empty()),
    })
}

/// Parse a `comments/{id}` response: `[post listing, comment listing]`.
fn parse_thread(text: &str) -> Result<(Option<Post>, CommentForest)> {
    let mut listings: Vec<Listing> = serde_json::from_str(text)?;
    if listings.is_empty() {
        return Err(AppError::crawl("comments", "empty thread response"));
    }

    let comment_listing = if listings.len() > 1 {
        Some(listings.remove(1))
    } else {
        None
    };
    let post = listings
        .remove(0)
        .data
        .children
        .into_iter()
        .find(|thing| thing.kind == "t3")
        .map(|thing| link_to_post(thing.data))
        .transpose()?;

    let roots = match comment_listing {
        Some(listing) => comment_nodes(listing.data.children)?,
        None => Vec::new(),
    };
    Ok((post, CommentForest::new(roots)))
}

fn parse_more_children(text: &str) -> Result<Vec<CommentNode>> {
    let response: MoreChildrenResponse = serde_json::from_str(text)?;
    if !response.json.errors.is_empty() {
        let errors: Vec<String> = response.json.errors.iter().map(Value::to_string).collect();
        return Err(AppError::crawl("morechildren", errors.join("; ")));
    }
    let things = response.json.data.map(|d| d.things).unwrap_or_default();
    comment_nodes(things)
}

fn comment_nodes(things: Vec<Thing>) -> Result<Vec<CommentNode>> {
    things
        .into_iter()
        .filter_map(|thing| comment_node(thing).transpose())
        .collect()
}

fn comment_node(thing: Thing) -> Result<Option<CommentNode>> {
    match thing.kind.as_str() {
        "t1" => {
            let data: CommentData = serde_json::from_value(thing.data)?;
            let replies = match data.replies {
                replies @ Value::Object(_) => {
                    let listing: Listing = serde_json::from_value(replies)?;
                    comment_nodes(listing.data.children)?
                }
                _ => Vec::new(),
            };
            Ok(Some(CommentNode::Comment(Comment {
                id: data.id,
                parent_id: data.parent_id,
                body: data.body,
                depth: data.depth,
                replies,
            })))
        }
        "more" => {
            let data: MoreData = serde_json::from_value(thing.data)?;
            Ok(Some(CommentNode::More(MoreComments {
                id: data.id,
                parent_id: data.parent_id,
                children: data.children,
                depth: data.depth,
            })))
        }
        _ => Ok(None),
    }
}
