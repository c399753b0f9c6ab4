// src/application/explore.rs
use std::fmt;
use std::str::FromStr;
use tracing::{debug, instrument};
use url::form_urlencoded;

use crate::application::sequencer::{RequestSequencer, RequestToken};
use crate::application::Backend;
use crate::constants::EXPLORE_PAGE_SIZE;
use crate::domain::document::decode_all;
use crate::domain::query::CREATED_AT;
use crate::domain::{BackendError, Collection, Document, Note, NoteKind, Query, Route};
use crate::ports::Notifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    #[default]
    Recent,
    Popular,
    Downloads,
}

impl SortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::Recent => "recent",
            SortBy::Popular => "popular",
            SortBy::Downloads => "downloads",
        }
    }

    /// The single ordering clause for this sort.
    pub fn ordering(&self) -> Query {
        match self {
            SortBy::Popular => Query::order_desc("likes"),
            SortBy::Downloads => Query::order_desc("downloads"),
            SortBy::Recent => Query::order_desc(CREATED_AT),
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "recent" => Ok(SortBy::Recent),
            "popular" => Ok(SortBy::Popular),
            "downloads" => Ok(SortBy::Downloads),
            other => Err(format!("unknown sort order: {other}")),
        }
    }
}

/// The user's search/filter/sort combination.
///
/// `kind == None` means "all types"; empty `subject`/`year` mean no constraint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExploreFilters {
    pub search: String,
    pub kind: Option<NoteKind>,
    pub subject: String,
    pub year: String,
    pub sort_by: SortBy,
}

impl ExploreFilters {
    /// Predicate list sent with the listing request.
    pub fn queries(&self) -> Vec<Query> {
        let mut queries = vec![Query::limit(EXPLORE_PAGE_SIZE)];

        if !self.search.is_empty() {
            queries.push(Query::search("title", &self.search));
        }
        if let Some(kind) = self.kind {
            queries.push(Query::equal("type", kind.as_str()));
        }
        if !self.subject.is_empty() {
            queries.push(Query::equal("subject", self.subject.as_str()));
        }
        if !self.year.is_empty() {
            queries.push(Query::equal("academicYear", self.year.as_str()));
        }

        queries.push(self.sort_by.ordering());
        queries
    }

    /// Address-bar form of the filters; defaults are left out.
    pub fn to_query_string(&self) -> String {
        let mut params = form_urlencoded::Serializer::new(String::new());
        if !self.search.is_empty() {
            params.append_pair("search", &self.search);
        }
        if let Some(kind) = self.kind {
            params.append_pair("type", kind.as_str());
        }
        if !self.subject.is_empty() {
            params.append_pair("subject", &self.subject);
        }
        if !self.year.is_empty() {
            params.append_pair("year", &self.year);
        }
        if self.sort_by != SortBy::Recent {
            params.append_pair("sortBy", self.sort_by.as_str());
        }
        params.finish()
    }

    /// Reads filters back from address state. Unrecognized values fall back to defaults.
    pub fn from_query_string(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut filters = Self::default();

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "search" => filters.search = value.into_owned(),
                "type" => filters.kind = value.parse().ok(),
                "subject" => filters.subject = value.into_owned(),
                "year" => filters.year = value.into_owned(),
                "sortBy" => filters.sort_by = value.parse().unwrap_or_default(),
                _ => debug!(%key, "Ignoring unknown address parameter"),
            }
        }
        filters
    }
}

/// A fetch that was issued but has not been applied yet.
#[derive(Debug, Clone)]
pub struct PendingFetch {
    pub token: RequestToken,
    pub queries: Vec<Query>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExploreStats {
    pub results: usize,
    pub notes: usize,
    pub papers: usize,
}

/// Search and browse screen.
pub struct ExploreView<B: Backend> {
    backend: B,
    filters: ExploreFilters,
    notes: Vec<Note>,
    loading: bool,
    sequencer: RequestSequencer,
    notifier: Notifier,
}

impl<B: Backend> ExploreView<B> {
    pub fn new(backend: B, filters: ExploreFilters) -> Self {
        Self {
            backend,
            filters,
            notes: Vec::new(),
            loading: false,
            sequencer: RequestSequencer::new(),
            notifier: Notifier::new(),
        }
    }

    /// Opens the view from the `explore` route's address state.
    pub fn from_address(backend: B, query: &str) -> Self {
        Self::new(backend, ExploreFilters::from_query_string(query))
    }

    pub fn filters(&self) -> &ExploreFilters {
        &self.filters
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn notifier(&mut self) -> &mut Notifier {
        &mut self.notifier
    }

    pub fn route(&self) -> Route {
        Route::Explore(self.filters.to_query_string())
    }

    pub fn set_search(&mut self, search: &str) {
        self.filters.search = search.to_string();
        self.refresh();
    }

    pub fn set_kind(&mut self, kind: Option<NoteKind>) {
        self.filters.kind = kind;
        self.refresh();
    }

    pub fn set_subject(&mut self, subject: &str) {
        self.filters.subject = subject.to_string();
        self.refresh();
    }

    pub fn set_year(&mut self, year: &str) {
        self.filters.year = year.to_string();
        self.refresh();
    }

    pub fn set_sort_by(&mut self, sort_by: SortBy) {
        self.filters.sort_by = sort_by;
        self.refresh();
    }

    pub fn clear_filters(&mut self) {
        self.filters = ExploreFilters::default();
        self.refresh();
    }

    /// Issues a new fetch; any fetch issued earlier becomes stale.
    pub fn begin_fetch(&mut self) -> PendingFetch {
        self.loading = true;
        PendingFetch {
            token: self.sequencer.issue(),
            queries: self.filters.queries(),
        }
    }

    /// Applies a fetch result. Returns `false` when the result was stale and dropped.
    pub fn complete_fetch(
        &mut self,
        pending: PendingFetch,
        result: Result<Vec<Document>, BackendError>,
    ) -> bool {
        if !self.sequencer.is_current(pending.token) {
            debug!(token = ?pending.token, "Dropping stale explore result");
            return false;
        }
        self.loading = false;

        match result {
            Ok(documents) => {
                self.notes = decode_all(&documents);
                true
            }
            Err(e) => {
                debug!(error = %e, "Explore fetch failed");
                self.notifier.error("Failed to load notes");
                true
            }
        }
    }

    #[instrument(level = "debug", skip(self), fields(address = %self.filters.to_query_string()))]
    pub fn refresh(&mut self) {
        let pending = self.begin_fetch();
        let result = self.backend.list_documents(Collection::Notes, &pending.queries);
        self.complete_fetch(pending, result);
    }

    pub fn stats(&self) -> ExploreStats {
        ExploreStats {
            results: self.notes.len(),
            notes: self.notes.iter().filter(|n| n.kind == NoteKind::Note).count(),
            papers: self
                .notes
                .iter()
                .filter(|n| n.kind == NoteKind::Question)
                .count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn given_default_filters_when_encoding_address_then_empty() {
        let filters = ExploreFilters::default();
        assert_eq!(filters.to_query_string(), "");
    }

    #[test]
    fn given_calculus_scenario_when_composing_then_matches_expected_predicates() {
        let filters = ExploreFilters {
            search: "calculus".to_string(),
            kind: Some(NoteKind::Note),
            subject: String::new(),
            year: "2nd Year".to_string(),
            sort_by: SortBy::Popular,
        };

        assert_eq!(
            filters.queries(),
            vec![
                Query::limit(50),
                Query::search("title", "calculus"),
                Query::equal("type", "note"),
                Query::equal("academicYear", "2nd Year"),
                Query::order_desc("likes"),
            ]
        );
        assert_eq!(
            filters.to_query_string(),
            "search=calculus&type=note&year=2nd+Year&sortBy=popular"
        );
    }

    #[rstest]
    #[case(SortBy::Recent, Query::order_desc("$createdAt"))]
    #[case(SortBy::Popular, Query::order_desc("likes"))]
    #[case(SortBy::Downloads, Query::order_desc("downloads"))]
    fn given_sort_when_composing_then_exactly_one_matching_ordering(
        #[case] sort_by: SortBy,
        #[case] expected: Query,
    ) {
        let filters = ExploreFilters {
            sort_by,
            subject: "Physics".to_string(),
            ..Default::default()
        };

        let queries = filters.queries();
        let orderings: Vec<&Query> = queries.iter().filter(|q| q.is_ordering()).collect();

        assert_eq!(orderings, vec![&expected]);
        assert_eq!(queries.last(), Some(&expected));
        assert_eq!(queries.first(), Some(&Query::limit(50)));
    }

    #[test]
    fn given_address_state_when_parsing_then_round_trips() {
        let filters = ExploreFilters::from_query_string(
            "?search=linear+algebra&subject=Computer%20Science&sortBy=downloads",
        );

        assert_eq!(filters.search, "linear algebra");
        assert_eq!(filters.subject, "Computer Science");
        assert_eq!(filters.sort_by, SortBy::Downloads);
        assert_eq!(filters.kind, None);
        assert_eq!(
            ExploreFilters::from_query_string(&filters.to_query_string()),
            filters
        );
    }

    #[test]
    fn given_unknown_values_when_parsing_then_falls_back_to_defaults() {
        let filters = ExploreFilters::from_query_string("type=lecture&sortBy=random&page=2");
        assert_eq!(filters, ExploreFilters::default());
    }
}
