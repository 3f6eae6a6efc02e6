use std::io::{self, Write};

use crate::config::RenderConfig;
use crate::display::{suggested_filename, GridEncoder, Palette, PngEncoder};
use crate::page::{image_url, render_page};
use crate::query::QueryParams;
use crate::state::RenderParams;
use crate::Result;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub content_type: &'static str,
    pub content_disposition: Option<String>,
    pub body: Vec<u8>,
}

impl Response {
    fn text(status: u16, body: String) -> Self {
        Self {
            status,
            content_type: "text/plain; charset=utf-8",
            content_disposition: None,
            body: body.into_bytes(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    /// Writes the response the way a CGI script does: headers, blank line, body.
    pub fn write_cgi(&self, out: &mut impl Write) -> io::Result<()> {
        if !self.is_success() {
            write!(out, "Status: {} {}\r\n", self.status, reason(self.status))?;
        }
        write!(out, "Content-Type: {}\r\n", self.content_type)?;
        if let Some(disposition) = &self.content_disposition {
            write!(out, "Content-Disposition: {disposition}\r\n")?;
        }
        write!(out, "Content-Length: {}\r\n\r\n", self.body.len())?;
        out.write_all(&self.body)?;
        out.flush()
    }
}

/// Answers one request: the image when `image=yes`, the HTML page otherwise.
pub fn respond(query: &QueryParams, config: &RenderConfig) -> Response {
    match try_respond(query, config) {
        Ok(response) => response,
        Err(err) if err.is_invalid_argument() => {
            tracing::warn!(%err, "rejected request");
            Response::text(400, format!("{err}\n"))
        }
        Err(err) => {
            tracing::error!(%err, "request failed");
            Response::text(500, format!("{err}\n"))
        }
    }
}

fn try_respond(query: &QueryParams, config: &RenderConfig) -> Result<Response> {
    let params = query.render_params(config)?;
    if query.flag("image") {
        image_response(&params, &config.palette)
    } else {
        page_response(&params, &config.endpoint)
    }
}

pub fn image_response(params: &RenderParams, palette: &Palette) -> Result<Response> {
    let rule = params.rule()?;
    let grid = params.render()?;
    let encoder = PngEncoder::new(*palette);
    let body = encoder.encode_to_vec(&grid)?;
    tracing::info!(%rule, cells = params.cells, steps = params.steps, bytes = body.len(), "image");

    Ok(Response {
        status: 200,
        content_type: encoder.content_type(),
        content_disposition: Some(format!(
            "inline; filename=\"{}\"",
            suggested_filename(rule, &encoder)
        )),
        body,
    })
}

pub fn page_response(params: &RenderParams, endpoint: &str) -> Result<Response> {
    let html = render_page(params, &image_url(endpoint, params))?;
    Ok(Response {
        status: 200,
        content_type: "text/html; charset=utf-8",
        content_disposition: None,
        body: html.into_bytes(),
    })
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        _ => "Internal Server Error",
    }
}
