//! AWS Lambda handler for generating annuity repayment plans
//!
//! Accepts a POST with a JSON body of `loanAmount`, `duration`, `nominalRate`
//! and `startDate`, and returns the plan as a JSON array of monthly payments.
//! Anything other than POST gets a 404; bad JSON or invalid params get a 400.
//!
//! Supports Lambda Function URLs for direct HTTP access.

use annuity_plan::{AnnuityEngine, GenerateRequest, PlanConfig};
use lambda_http::http::{Method, StatusCode};
use lambda_http::{run, service_fn, Body, Error, Request, Response};

const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

fn empty_response(status: StatusCode) -> Result<Response<Body>, Error> {
    Ok(Response::builder().status(status).body(Body::Empty)?)
}

fn error_response(status: StatusCode, message: &str) -> Result<Response<Body>, Error> {
    let body = serde_json::json!({ "error": message });
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", JSON_CONTENT_TYPE)
        .body(Body::Text(body.to_string()))?)
}

fn json_response(body: String) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", JSON_CONTENT_TYPE)
        .body(Body::Text(body))?)
}

/// Serve one plan request with the given engine
fn generate_plan(engine: &AnnuityEngine, event: &Request) -> Result<Response<Body>, Error> {
    if *event.method() != Method::POST {
        return empty_response(StatusCode::NOT_FOUND);
    }

    let body: &[u8] = match event.body() {
        Body::Text(s) => s.as_bytes(),
        Body::Binary(b) => b.as_slice(),
        Body::Empty => &[],
    };

    let request: GenerateRequest = match serde_json::from_slice(body) {
        Ok(r) => r,
        Err(e) => {
            log::warn!("error parsing json request body: {}", e);
            return error_response(StatusCode::BAD_REQUEST, &format!("Invalid JSON: {}", e));
        }
    };

    let terms = match request.validate() {
        Ok(t) => t,
        Err(e) => {
            log::warn!("error validating request params: {}", e);
            return error_response(StatusCode::BAD_REQUEST, &e.to_string());
        }
    };
    log::debug!("request params: {:?}", request);

    let plan = match engine.project_loan(&terms) {
        Ok(p) => p,
        Err(e) => {
            log::warn!("error generating plan: {}", e);
            return error_response(StatusCode::BAD_REQUEST, &e.to_string());
        }
    };

    json_response(serde_json::to_string(plan.payments())?)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();

    let engine = AnnuityEngine::new(PlanConfig::from_env());
    log::info!("starting plan handler ({} due dates)", engine.config().due_date_rule);

    run(service_fn(move |event: Request| {
        let engine = engine.clone();
        async move { generate_plan(&engine, &event) }
    }))
    .await
}
