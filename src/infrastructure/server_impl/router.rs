use crate::api::{echo_route, files_route, root_route, user_agent_route};
use crate::application::ServerData;
use crate::infrastructure::server_impl::request::Request;
use crate::infrastructure::server_impl::response::{Response, StatusCode};
use crate::infrastructure::server_impl::server::Method;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Pattern {
    Exact(&'static str),
    /// Matches the segment itself or the segment followed by `/`.
    Prefix(&'static str),
}

impl Pattern {
    /// Returns what is left of `resource` once the pattern is stripped, if it matches.
    pub fn strip(self, resource: &str) -> Option<&str> {
        match self {
            Self::Exact(path) => (resource == path).then_some(""),
            Self::Prefix(prefix) => match resource.strip_prefix(prefix)? {
                "" => Some(""),
                rest => rest.strip_prefix('/'),
            },
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Root,
    Echo,
    UserAgent,
    Files,
}

#[derive(Debug, Copy, Clone)]
pub struct Route {
    /// `None` accepts any method; the endpoint decides.
    pub method: Option<Method>,
    pub pattern: Pattern,
    pub endpoint: Endpoint,
}

/// Evaluated in order, first match wins.
pub static ROUTES: [Route; 4] = [
    Route {
        method: Some(Method::GET),
        pattern: Pattern::Exact("/"),
        endpoint: Endpoint::Root,
    },
    Route {
        method: Some(Method::GET),
        pattern: Pattern::Prefix("/echo"),
        endpoint: Endpoint::Echo,
    },
    Route {
        method: Some(Method::GET),
        pattern: Pattern::Exact("/user-agent"),
        endpoint: Endpoint::UserAgent,
    },
    Route {
        method: None,
        pattern: Pattern::Prefix("/files"),
        endpoint: Endpoint::Files,
    },
];

pub fn resolve(method: Method, resource: &str) -> Option<(Endpoint, &str)> {
    ROUTES
        .iter()
        .filter(|route| route.method.map_or(true, |m| m == method))
        .find_map(|route| Some((route.endpoint, route.pattern.strip(resource)?)))
}

pub async fn match_routes(server_data: &ServerData, request: Request<'_>) -> Response {
    if !matches!(request.method, Method::GET | Method::POST) {
        tracing::warn!(method = ?request.method, resource = request.resource, "method not implemented");
        return Response::from_status_code(StatusCode::MethodNotAllowed);
    }

    let Some((endpoint, rest)) = resolve(request.method, request.resource) else {
        return Response::from_status_code(StatusCode::NotFound);
    };

    let response = match endpoint {
        Endpoint::Root => Ok(root_route()),
        Endpoint::Echo => echo_route(&request, rest),
        Endpoint::UserAgent => Ok(user_agent_route(&request)),
        Endpoint::Files => files_route(server_data, &request, rest).await,
    };

    response.unwrap_or_else(|err| {
        tracing::error!(?endpoint, resource = request.resource, "handler failed: {err:#}");
        Response::from_status_code(StatusCode::InternalServerError)
    })
}
