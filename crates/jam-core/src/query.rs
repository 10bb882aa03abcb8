//! List Query Engine.
//!
//! One generic implementation of the filter/search/facet/paginate pipeline
//! shared by the posts, comments, users and audio-upload list endpoints.
//! The store hands over the full collection; everything here happens on a
//! request-scoped, in-memory snapshot. There is no snapshot isolation across
//! page requests: a concurrent insert or delete between pages can shift
//! results, which the cursor contract accepts.
//!
//! Pipeline order: owner/parent filter → substring search → facet filter →
//! sort ascending by id → drop everything at or before the cursor → take one
//! page. All active filters are ANDed; within one facet the selected values
//! are ORed.

use uuid::Uuid;

use crate::models::{AudioUpload, Comment, Document, Post, User};
use crate::tags::{tags_of_type, FacetKind};

/// Page size used when the request does not carry a usable `limit`.
pub const DEFAULT_PAGE_SIZE: usize = 10;
/// Hard upper bound; larger requests are clamped, not rejected.
pub const MAX_PAGE_SIZE: usize = 50;

/// A record the engine can list: how to match its owner key, which text
/// fields the substring search covers, and which tags carry facets.
pub trait Listable: Document {
    /// Exact-match against the endpoint's owner/parent filter value.
    /// A key that cannot possibly match (wrong shape, unknown id) is simply
    /// no match — never an error.
    fn matches_owner(&self, key: &str) -> bool {
        let _ = key;
        false
    }

    /// The text fields the `search` parameter is matched against.
    fn search_haystack(&self) -> Vec<&str> {
        Vec::new()
    }

    /// Tags consulted by the facet filter.
    fn facet_tags(&self) -> &[String] {
        &[]
    }
}

/// Facet selections: skill is single-select, instruments and genres are
/// OR-groups. An empty facet is open (not applied).
#[derive(Debug, Clone, Default)]
pub struct FacetFilter {
    pub skill: Option<String>,
    pub instruments: Vec<String>,
    pub genres: Vec<String>,
}

impl FacetFilter {
    pub fn is_empty(&self) -> bool {
        self.skill.is_none() && self.instruments.is_empty() && self.genres.is_empty()
    }

    fn matches(&self, tags: &[String]) -> bool {
        if let Some(skill) = &self.skill {
            if !facet_contains(tags, FacetKind::Skill, std::slice::from_ref(skill)) {
                return false;
            }
        }
        if !self.instruments.is_empty()
            && !facet_contains(tags, FacetKind::Instrument, &self.instruments)
        {
            return false;
        }
        if !self.genres.is_empty() && !facet_contains(tags, FacetKind::Genre, &self.genres) {
            return false;
        }
        true
    }
}

fn facet_contains(tags: &[String], kind: FacetKind, wanted: &[String]) -> bool {
    let values = tags_of_type(tags, kind);
    values
        .iter()
        .any(|value| wanted.iter().any(|w| w.eq_ignore_ascii_case(value)))
}

/// Parameters of one list request.
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    /// Owner/parent exact-match filter (posts/audio: author id; comments:
    /// parent record id as a string).
    pub owner_key: Option<String>,
    /// Case-insensitive substring, matched against any haystack field.
    pub search: Option<String>,
    pub facets: FacetFilter,
    /// Resume strictly after this id. An id absent from the filtered set
    /// restarts from the top.
    pub cursor: Option<Uuid>,
    /// Requested page size; 0 falls back to [`DEFAULT_PAGE_SIZE`], anything
    /// above [`MAX_PAGE_SIZE`] is clamped.
    pub limit: usize,
}

/// One page of results plus the cursor for the next one. `next_cursor` is
/// `None` once the listing is exhausted.
#[derive(Debug, Clone)]
pub struct ListPage<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<Uuid>,
}

/// Runs the full pipeline over a collection snapshot.
///
/// Walking the pages (passing each `next_cursor` back in until it is `None`)
/// visits every matching record exactly once, in ascending id order, as long
/// as the collection is not mutated in between.
pub fn query_list<T: Listable>(records: Vec<T>, params: &ListParams) -> ListPage<T> {
    let limit = match params.limit {
        0 => DEFAULT_PAGE_SIZE,
        n => n.min(MAX_PAGE_SIZE),
    };

    let needle = params
        .search
        .as_deref()
        .map(str::to_lowercase)
        .filter(|s| !s.is_empty());

    let mut matching: Vec<T> = records
        .into_iter()
        .filter(|record| {
            if let Some(key) = &params.owner_key {
                if !record.matches_owner(key) {
                    return false;
                }
            }
            if let Some(needle) = &needle {
                let hit = record
                    .search_haystack()
                    .iter()
                    .any(|field| field.to_lowercase().contains(needle));
                if !hit {
                    return false;
                }
            }
            if !params.facets.is_empty() && !params.facets.matches(record.facet_tags()) {
                return false;
            }
            true
        })
        .collect();

    // UUID byte order equals the hyphenated-string order, so this is the
    // same lexicographic ordering the cursor contract is defined over.
    matching.sort_by_key(|record| record.id());

    let start = match params.cursor {
        Some(cursor) => matching
            .iter()
            .position(|record| record.id() == cursor)
            .map(|idx| idx + 1)
            .unwrap_or(0),
        None => 0,
    };

    let items: Vec<T> = matching.into_iter().skip(start).take(limit).collect();
    let next_cursor = if items.len() == limit {
        items.last().map(|record| record.id())
    } else {
        None
    };

    ListPage { items, next_cursor }
}

impl Listable for Post {
    fn matches_owner(&self, key: &str) -> bool {
        self.user_id == key
    }

    // Raw tag strings are searched on purpose: "guitar" should hit
    // "instrument:guitar" even though the prefix is a facet marker.
    fn search_haystack(&self) -> Vec<&str> {
        let mut fields = vec![self.title.as_str(), self.body.as_str()];
        fields.extend(self.tags.iter().map(String::as_str));
        fields
    }

    fn facet_tags(&self) -> &[String] {
        &self.tags
    }
}

impl Listable for Comment {
    fn matches_owner(&self, key: &str) -> bool {
        Uuid::parse_str(key)
            .map(|parent| parent == self.parent_id)
            .unwrap_or(false)
    }

    fn search_haystack(&self) -> Vec<&str> {
        vec![self.text.as_str()]
    }
}

impl Listable for AudioUpload {
    fn matches_owner(&self, key: &str) -> bool {
        self.user_id == key
    }

    fn search_haystack(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = self.title.as_deref().into_iter().collect();
        fields.extend(self.tags.iter().map(String::as_str));
        fields
    }

    fn facet_tags(&self) -> &[String] {
        &self.tags
    }
}

impl Listable for User {
    fn search_haystack(&self) -> Vec<&str> {
        let mut fields = vec![self.username.as_str()];
        fields.extend(self.preferred_genre.as_deref());
        fields.extend(self.instruments.iter().map(String::as_str));
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn post(seq: u128, user: &str, title: &str, tags: &[&str]) -> Post {
        Post {
            id: Uuid::from_u128(seq),
            user_id: user.to_string(),
            user_name: None,
            title: title.to_string(),
            body: format!("body of {title}"),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            audio_upload_id: None,
            album_art_url: None,
            created_at: Utc::now(),
        }
    }

    fn posts(n: u128) -> Vec<Post> {
        (1..=n).map(|i| post(i, "u1", &format!("post {i}"), &[])).collect()
    }

    #[test]
    fn full_traversal_visits_each_record_once_in_order() {
        let mut params = ListParams {
            limit: 7,
            ..Default::default()
        };
        let mut seen = Vec::new();
        loop {
            let page = query_list(posts(23), &params);
            assert!(page.items.len() <= 7);
            seen.extend(page.items.iter().map(|p| p.id));
            match page.next_cursor {
                Some(cursor) => params.cursor = Some(cursor),
                None => break,
            }
        }
        let expected: Vec<Uuid> = (1..=23).map(Uuid::from_u128).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn twelve_posts_paged_by_five() {
        let mut params = ListParams {
            limit: 5,
            ..Default::default()
        };

        let page1 = query_list(posts(12), &params);
        assert_eq!(page1.items.len(), 5);
        assert_eq!(page1.next_cursor, Some(Uuid::from_u128(5)));

        params.cursor = page1.next_cursor;
        let page2 = query_list(posts(12), &params);
        assert_eq!(page2.items.len(), 5);
        assert_eq!(page2.next_cursor, Some(Uuid::from_u128(10)));

        params.cursor = page2.next_cursor;
        let page3 = query_list(posts(12), &params);
        assert_eq!(page3.items.len(), 2);
        assert_eq!(page3.next_cursor, None);
    }

    #[test]
    fn limit_is_clamped_to_fifty() {
        let page = query_list(posts(60), &ListParams { limit: 9999, ..Default::default() });
        assert_eq!(page.items.len(), MAX_PAGE_SIZE);
        assert_eq!(page.next_cursor, Some(Uuid::from_u128(50)));
    }

    #[test]
    fn zero_limit_falls_back_to_default() {
        let page = query_list(posts(30), &ListParams::default());
        assert_eq!(page.items.len(), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn unknown_cursor_restarts_from_the_top() {
        let page = query_list(
            posts(5),
            &ListParams {
                cursor: Some(Uuid::from_u128(0xdead_beef)),
                limit: 3,
                ..Default::default()
            },
        );
        assert_eq!(page.items[0].id, Uuid::from_u128(1));
    }

    #[test]
    fn exactly_full_last_page_yields_one_empty_page() {
        // 10 records, limit 5: the second page is full, so a cursor is
        // handed out and the third call returns an empty, final page.
        let mut params = ListParams { limit: 5, ..Default::default() };
        let page1 = query_list(posts(10), &params);
        params.cursor = page1.next_cursor;
        let page2 = query_list(posts(10), &params);
        assert_eq!(page2.items.len(), 5);
        assert!(page2.next_cursor.is_some());
        params.cursor = page2.next_cursor;
        let page3 = query_list(posts(10), &params);
        assert!(page3.items.is_empty());
        assert_eq!(page3.next_cursor, None);
    }

    #[test]
    fn owner_filter_is_exact_and_permissive() {
        let records = vec![post(1, "alice", "a", &[]), post(2, "bob", "b", &[])];
        let page = query_list(
            records.clone(),
            &ListParams {
                owner_key: Some("alice".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].user_id, "alice");

        // An owner nobody has yields an empty page, not an error.
        let page = query_list(
            records,
            &ListParams {
                owner_key: Some("nobody".to_string()),
                ..Default::default()
            },
        );
        assert!(page.items.is_empty());
        assert_eq!(page.next_cursor, None);
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let records = vec![
            post(1, "u1", "Looking for a Drummer", &[]),
            post(2, "u1", "selling amp", &[]),
            post(3, "u1", "untitled", &["instrument:drums"]),
        ];
        for needle in ["drummer", "DRUMMER"] {
            let page = query_list(
                records.clone(),
                &ListParams {
                    search: Some(needle.to_string()),
                    ..Default::default()
                },
            );
            assert_eq!(page.items.len(), 1, "search={needle}");
            assert_eq!(page.items[0].id, Uuid::from_u128(1));
        }
        // Tag strings are part of the haystack.
        let page = query_list(
            records,
            &ListParams {
                search: Some("drums".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, Uuid::from_u128(3));
    }

    #[test]
    fn facets_or_within_and_across() {
        let records = vec![
            post(1, "u1", "guitar rock", &["instrument:guitar", "genre:rock"]),
            post(2, "u1", "bass rock", &["instrument:bass", "genre:rock"]),
            post(3, "u1", "guitar jazz", &["instrument:guitar", "genre:jazz"]),
            post(4, "u1", "drums rock", &["instrument:drums", "genre:rock"]),
        ];
        let page = query_list(
            records,
            &ListParams {
                facets: FacetFilter {
                    instruments: vec!["guitar".to_string(), "drums".to_string()],
                    genres: vec!["rock".to_string()],
                    ..Default::default()
                },
                ..Default::default()
            },
        );
        // (guitar OR drums) AND rock
        let ids: Vec<Uuid> = page.items.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![Uuid::from_u128(1), Uuid::from_u128(4)]);
    }

    #[test]
    fn skill_facet_is_single_select() {
        let records = vec![
            post(1, "u1", "a", &["skill:Amateur"]),
            post(2, "u1", "b", &["skill:Professional"]),
        ];
        let page = query_list(
            records,
            &ListParams {
                facets: FacetFilter {
                    skill: Some("amateur".to_string()),
                    ..Default::default()
                },
                ..Default::default()
            },
        );
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, Uuid::from_u128(1));
    }

    #[test]
    fn comment_owner_key_is_the_parent_id() {
        let parent = Uuid::from_u128(77);
        let comment = Comment {
            id: Uuid::from_u128(1),
            user_id: None,
            user_name: None,
            parent_type: crate::models::ParentKind::Post,
            parent_id: parent,
            text: "nice take".to_string(),
            created_at: Utc::now(),
        };
        assert!(comment.matches_owner(&parent.to_string()));
        assert!(!comment.matches_owner(&Uuid::from_u128(78).to_string()));
        // A malformed key is no match, never an error.
        assert!(!comment.matches_owner("not-a-uuid"));
    }
}
