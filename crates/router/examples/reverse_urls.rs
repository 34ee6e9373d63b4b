use micro_router::router::get;
use micro_router::{Converter, NoReverseMatch, PathValue, Request, Response, Router, handler_fn};

use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

fn noop(_req: &mut Request, _resp: &mut Response, _id: i64) {}

fn article(_req: &mut Request, _resp: &mut Response, _year: i64, _slug: String) {}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    // a four-digit year, stricter than the built-in int
    let year = Converter::new(
        "year",
        "[0-9]{4}",
        |raw| raw.parse::<i64>().map(PathValue::Int).map_err(|e| micro_router::ConvertError::invalid_int(raw, e)),
        |value| value.as_int().map(|y| format!("{y:04}")),
    );

    let router = Router::builder()
        .converters([year])
        .route("/a/<int:id>/", get(handler_fn(noop)).named("a"))
        .route("/articles/<year:year>/<slug:slug>/", get(handler_fn(article)).named("article"))
        .build()?;

    info!(url = %router.reverse("a", &[123456.into()])?, "resolved 'a'");
    info!(url = %router.reverse("article", &[2026.into(), "hello-world".into()])?, "resolved 'article'");

    // failures are all NoReverseMatch, one error kind for link generation
    match router.reverse("unknown", &[]) {
        Err(NoReverseMatch::UnknownName { name }) => info!(name, "no such route"),
        other => info!(?other, "unexpected"),
    }
    match router.reverse("article", &[2026.into()]) {
        Err(e @ NoReverseMatch::ArgumentCount { .. }) => info!(%e, "argument count"),
        other => info!(?other, "unexpected"),
    }

    Ok(())
}
