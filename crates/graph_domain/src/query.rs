/// Which endpoint serves FQL queries.
///
/// `Legacy` is the deprecated REST method endpoint (`fql.query` /
/// `fql.multiquery` on the read-only host); `Graph` is the Graph API `fql`
/// edge. Both share one execution path in the client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QueryEndpoint {
    #[default]
    Graph,
    Legacy,
}

impl QueryEndpoint {
    /// Path relative to the endpoint's base URL.
    pub fn path(&self, multiquery: bool) -> &'static str {
        match (self, multiquery) {
            (QueryEndpoint::Graph, _) => "fql",
            (QueryEndpoint::Legacy, false) => "fql.query",
            (QueryEndpoint::Legacy, true) => "fql.multiquery",
        }
    }

    /// Name of the parameter carrying the query text.
    pub fn query_parameter(&self, multiquery: bool) -> &'static str {
        match (self, multiquery) {
            (QueryEndpoint::Graph, _) => "q",
            (QueryEndpoint::Legacy, false) => "query",
            (QueryEndpoint::Legacy, true) => "queries",
        }
    }
}
