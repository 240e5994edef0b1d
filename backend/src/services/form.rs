use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse};
use include_dir::{include_dir, Dir};
use mime_guess::from_path;

static ASSETS: Dir = include_dir!("$CARGO_MANIFEST_DIR/static");

/// The page every unmatched path falls back to.
const UPLOAD_FORM: &str = "index.html";

/// Serves a bundled asset by path, or the upload form when nothing matches.
pub async fn asset(req: HttpRequest) -> HttpResponse {
    let requested = req.path().trim_start_matches('/');
    let file = Some(requested)
        .filter(|p| !p.is_empty())
        .and_then(|p| ASSETS.get_file(p))
        .or_else(|| ASSETS.get_file(UPLOAD_FORM));

    let Some(file) = file else {
        return HttpResponse::NotFound().finish();
    };

    let mime = from_path(file.path()).first_or_octet_stream();
    HttpResponse::Ok()
        .content_type(mime.as_ref())
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .body(file.contents())
}
