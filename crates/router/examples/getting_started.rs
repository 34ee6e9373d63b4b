use http::Method;
use micro_router::router::{any, get};
use micro_router::{DispatchOutcome, Next, Request, Response, Router, handler_fn, middleware_fn};

use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

fn hello(_req: &mut Request, resp: &mut Response, name: String, age: i64) {
    resp.write(format!("hello {name}, age {age}\n"));
}

fn car_detail(_req: &mut Request, resp: &mut Response, model: String, make: i64) {
    resp.write(format!("model {model}, make {make}\n"));
}

fn serve_file(_req: &mut Request, resp: &mut Response, rest: String) {
    resp.write(format!("would serve {rest}\n"));
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::DEBUG).finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let router = Router::builder()
        .route("/hello/<name>/<int:age>/", get(handler_fn(hello)).named("hello"))
        .route("/make/<string:model>/model/<int:make>/", get(handler_fn(car_detail)).named("car-detail"))
        .route("/files/<path:rest>", any(handler_fn(serve_file)))
        .middleware(middleware_fn(|req: &mut Request, resp: &mut Response, next: &dyn Next| {
            let outcome = next.run(req, resp)?;
            info!(method = %req.method(), path = req.path(), outcome = ?outcome, "dispatched");
            Ok(outcome)
        }))
        .build()?;

    // a real deployment adapts its server's requests into `Request` and calls
    // `dispatch` as the terminal handler; here we fake a few requests by hand
    for path in ["/hello/Sam/30/", "/make/porsche/model/911/", "/files/css/main.css", "/nothing/here/"] {
        let mut req = Request::new(Method::GET, path.parse()?);
        let mut resp = Response::new();

        match router.dispatch(&mut req, &mut resp)? {
            DispatchOutcome::Handled => print!("{}", String::from_utf8_lossy(resp.body())),
            DispatchOutcome::Unmatched => println!("no route for {path}"),
        }
    }

    let url = router.reverse("car-detail", &["porsche".into(), 911.into()])?;
    println!("car-detail lives at {url}");

    Ok(())
}
