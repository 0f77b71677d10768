use rocket::{
    fairing::{Fairing, Info, Kind},
    http::{Header, Method, Status},
    Request, Response,
};

const ALLOW_ORIGIN: &str = "Access-Control-Allow-Origin";
const ALLOW_METHODS: &str = "Access-Control-Allow-Methods";
const ALLOW_HEADERS: &str = "Access-Control-Allow-Headers";
const REQUEST_HEADERS: &str = "Access-Control-Request-Headers";

const METHODS: &str = "DELETE, GET, HEAD, OPTIONS, PATCH, POST, PUT";

/// Allows cross-origin requests from any origin.
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Cross-Origin Resource Sharing",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new(ALLOW_ORIGIN, "*"));

        if request.method() == Method::Options {
            response.set_header(Header::new(ALLOW_METHODS, METHODS));
            if let Some(headers) = request.headers().get_one(REQUEST_HEADERS) {
                response.set_header(Header::new(ALLOW_HEADERS, headers.to_owned()));
            }
        }
    }
}

/// Answers preflight requests, the headers themselves are set by [`Cors`].
#[rocket::options("/<_..>")]
pub fn preflight() -> Status {
    Status::Ok
}
