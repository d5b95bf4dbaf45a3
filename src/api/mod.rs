use crate::application::ServerData;
use crate::domain::encoding::ContentEncoding;
use crate::infrastructure::server_impl::request::Request;
use crate::infrastructure::server_impl::response::{
    Response, StatusCode, TextResponse, OCTET_STREAM,
};
use crate::infrastructure::server_impl::server::{Header, Method};
use crate::AnyResult;
use eyre::WrapErr;

pub fn root_route() -> Response {
    Response::from_status_code(StatusCode::Ok)
}

pub fn echo_route(req: &Request<'_>, value: &str) -> AnyResult<Response> {
    let encoding = ContentEncoding::from_accept_encoding(req.header(Header::ACCEPT_ENCODING));
    let response = TextResponse::encoded(value.as_bytes(), encoding)
        .wrap_err("Failed to encode echo body.")?;

    Ok(response.0)
}

pub fn user_agent_route(req: &Request<'_>) -> Response {
    let user_agent = req.header(Header::USER_AGENT).unwrap_or_default();
    TextResponse::new(user_agent.as_bytes().to_vec()).0
}

/// `GET` reads `name` from the served directory, `POST` creates it from the request body.
pub async fn files_route(
    server_data: &ServerData,
    req: &Request<'_>,
    name: &str,
) -> AnyResult<Response> {
    match req.method {
        Method::GET => Ok(read_file_route(server_data, name).await),
        Method::POST => create_file_route(server_data, req, name).await,
        _ => Ok(Response::from_status_code(StatusCode::MethodNotAllowed)),
    }
}

async fn read_file_route(server_data: &ServerData, name: &str) -> Response {
    match server_data.files.read(name).await {
        Ok(contents) => Response::from_status_code(StatusCode::Ok).with_payload(OCTET_STREAM, contents),
        Err(err) => {
            tracing::debug!(file = name, "file not served: {err}");
            Response::from_status_code(StatusCode::NotFound)
        }
    }
}

async fn create_file_route(
    server_data: &ServerData,
    req: &Request<'_>,
    name: &str,
) -> AnyResult<Response> {
    if server_data.files.resolve(name).is_none() {
        return Ok(Response::from_status_code(StatusCode::NotFound));
    }

    server_data
        .files
        .write(name, req.body.trim_ascii())
        .await
        .wrap_err_with(|| format!("Failed to write `{name}`."))?;

    tracing::debug!(file = name, bytes = req.body.len(), "file created");
    Ok(Response::from_status_code(StatusCode::Created))
}
