use crate::model::{ShiftDraft, ShiftId, ShiftPatch};
use crate::service::{ShiftError, ShiftQuery, ShiftService};
use crate::store::{Page, ShiftStore};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Read;
use tiny_http::{Header, Method, Response, Server};
use tracing::{error, info};

/// Enveloppe de réponse commune : `{ statusCode, message, results }`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiReply {
    pub status_code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<serde_json::Value>,
}

impl ApiReply {
    fn ok(message: &str, results: serde_json::Value) -> Self {
        Self {
            status_code: 200,
            message: message.to_string(),
            results: Some(results),
        }
    }

    fn fail(status_code: u16, message: String) -> Self {
        Self {
            status_code,
            message,
            results: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublishBody {
    week_id: NaiveDate,
}

/// Sert l'API séquentiellement sur `addr` (bloquant). Le traitement
/// mono-thread sérialise les séquences lecture-décision-écriture de
/// chaque requête vis-à-vis des autres.
pub fn serve<S: ShiftStore>(addr: &str, service: &ShiftService<S>) -> anyhow::Result<()> {
    let server =
        Server::http(addr).map_err(|e| anyhow::anyhow!("failed to bind {addr}: {e}"))?;
    info!(%addr, "listening");

    for mut request in server.incoming_requests() {
        let mut body = String::new();
        let reply = match request.as_reader().read_to_string(&mut body) {
            Ok(_) => handle(service, request.method(), request.url(), &body),
            Err(e) => ApiReply::fail(400, format!("unreadable request body: {e}")),
        };
        let json = match serde_json::to_string(&reply) {
            Ok(json) => json,
            Err(e) => {
                error!(%e, "serializing reply");
                continue;
            }
        };
        let response = Response::from_string(json)
            .with_status_code(reply.status_code)
            .with_header(Header::from_bytes("Content-Type", "application/json").unwrap());
        if let Err(e) = request.respond(response) {
            error!(%e, "sending reply");
        }
    }
    Ok(())
}

/// Routage pur : traduit (méthode, url, corps) en appel de service puis en
/// enveloppe. Séparé de la boucle réseau pour rester testable.
pub fn handle<S: ShiftStore>(
    service: &ShiftService<S>,
    method: &Method,
    url: &str,
    body: &str,
) -> ApiReply {
    info!(%method, url, "request");
    let (path, raw_query) = match url.split_once('?') {
        Some((path, query)) => (path, query),
        None => (url, ""),
    };
    let path = path.strip_prefix("/v1").unwrap_or(path);
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    match (method, segments.as_slice()) {
        (Method::Get, ["shifts"]) => match parse_query(raw_query) {
            Ok((query, page)) => reply(
                "Get shift successful",
                service
                    .find(&query, page)
                    .map(|(data, total_count)| json!({ "data": data, "totalCount": total_count })),
            ),
            Err(message) => ApiReply::fail(400, message),
        },
        (Method::Get, ["shifts", id]) => reply(
            "Get shift successful",
            service.find_by_id(&ShiftId::new(id)).map(|s| json!(s)),
        ),
        (Method::Post, ["shifts"]) => match parse_body::<ShiftDraft>(body) {
            Ok(draft) => reply(
                "Create shift successful",
                service.create(draft).map(|s| json!(s)),
            ),
            Err(message) => ApiReply::fail(400, message),
        },
        (Method::Post, ["shifts", "publish"]) => match parse_body::<PublishBody>(body) {
            Ok(publish) => reply(
                "Update shift successful",
                service.publish_week(publish.week_id).map(|s| json!(s)),
            ),
            Err(message) => ApiReply::fail(400, message),
        },
        (Method::Patch, ["shifts", id]) => match parse_body::<ShiftPatch>(body) {
            Ok(patch) => reply(
                "Update shift successful",
                service.update_by_id(&ShiftId::new(id), patch).map(|s| json!(s)),
            ),
            Err(message) => ApiReply::fail(400, message),
        },
        (Method::Delete, ["shifts", id]) => reply(
            "Delete shift successful",
            service
                .delete_by_id(&ShiftId::new(id))
                .map(|deleted| json!({ "deleted": deleted })),
        ),
        _ => ApiReply::fail(404, format!("no route for {method} {path}")),
    }
}

fn reply(message: &str, outcome: Result<serde_json::Value, ShiftError>) -> ApiReply {
    match outcome {
        Ok(results) => ApiReply::ok(message, results),
        Err(err) => {
            error!(%err, "request failed");
            let status = match &err {
                ShiftError::Overlapping { .. }
                | ShiftError::AlreadyPublished
                | ShiftError::InvalidTimeRange => 400,
                ShiftError::NotFound(_) => 404,
                ShiftError::Store(_) => 500,
            };
            ApiReply::fail(status, err.to_string())
        }
    }
}

fn parse_body<T: for<'de> Deserialize<'de>>(body: &str) -> Result<T, String> {
    serde_json::from_str(body).map_err(|e| format!("invalid payload: {e}"))
}

fn parse_query(raw: &str) -> Result<(ShiftQuery, Page), String> {
    let mut query = ShiftQuery::default();
    let mut page = Page::default();
    for pair in raw.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let value = urlencoding::decode(value)
            .map_err(|_| format!("invalid encoding for parameter {key}"))?;
        match key {
            "weekId" => query.week_id = Some(parse_date(&value)?),
            "date" => query.date = Some(parse_date(&value)?),
            "name" => query.name = Some(value.into_owned()),
            "isPublished" => query.is_published = Some(parse_bool(&value)?),
            "limit" => page.limit = Some(parse_int(key, &value)?),
            "offset" => page.offset = Some(parse_int(key, &value)?),
            _ => return Err(format!("unknown query parameter: {key}")),
        }
    }
    Ok((query, page))
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| format!("invalid date: {raw}"))
}

fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(format!("invalid boolean: {raw}")),
    }
}

fn parse_int(key: &str, raw: &str) -> Result<u32, String> {
    raw.parse().map_err(|_| format!("invalid {key}: {raw}"))
}
