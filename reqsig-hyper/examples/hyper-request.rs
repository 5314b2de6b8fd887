use bytes::Bytes;
use http::Request;
use http_body_util::{BodyExt, Full};
use reqsig_hyper::{prelude::*, *};

type BoxBody = http_body_util::combinators::BoxBody<Bytes, HyperSigError>;

const PUBLIC_ID: &str = "client-01";
const SECRET: &str = "uzvJfB4u3N0Jy4T7NZ75MDVcr8zSTInedJtkgcu46YW4XByzNJjxBdtjUkdJPBtbmHhIDi6pcl8jsasjlTMtDQ==";

fn build_request() -> Request<BoxBody> {
  let body = Full::new(Bytes::from_static(b"{\"hello\": \"world\"}"))
    .map_err(|never| match never {})
    .boxed();
  Request::builder()
    .method("POST")
    .uri("https://example.com/parameters?var=this%20is%20a%20big%0Amultiline%20value&bar=with+plus+whitespace")
    .header("content-type", "application/json")
    .body(body)
    .unwrap()
}

/// Sender function that generates a request with a signature
async fn sender(req: Request<BoxBody>) -> Request<Full<Bytes>> {
  println!("Signing with HMAC-SHA256 as {PUBLIC_ID}");
  let credential = Credential::new(PUBLIC_ID, SECRET);
  req.set_request_signature(&credential).await.unwrap()
}

/// Receiver function that verifies a request with a signature
async fn receiver<B>(req: Request<B>) -> HyperSigResult<Request<Full<Bytes>>>
where
  B: http_body::Body + Send,
  B::Data: Send,
  B::Error: std::fmt::Display,
{
  println!("Verifying signature of key id {:?}", req.get_key_id());
  // secrets are usually loaded from configuration or a secret store
  let store = StaticCredentialStore::new([(PUBLIC_ID, SECRET)]);
  req.verify_request_signature(&store).await
}

async fn scenario_single_signature() {
  println!("--------------  Scenario: Single signature with HMAC-SHA256  --------------");

  let request_from_sender = build_request();
  println!("Request uri before signing:\n{}", request_from_sender.uri());

  let request_from_sender = sender(request_from_sender).await;
  println!("Request uri after signing:\n{}", request_from_sender.uri());
  assert!(request_from_sender.has_request_signature());

  let verification_res = receiver(request_from_sender).await;
  assert!(verification_res.is_ok());
  println!("Signature is verified");
}

async fn scenario_tampered_query() {
  println!("--------------  Scenario: Tampered query  --------------");

  let request_from_sender = sender(build_request()).await;
  let (mut parts, body) = request_from_sender.into_parts();
  let tampered = parts.uri.to_string().replace("bar=with", "bar=without");
  parts.uri = tampered.parse().unwrap();
  println!("Tampered request uri:\n{}", parts.uri);

  let verification_res = receiver(Request::from_parts(parts, body)).await;
  assert!(matches!(verification_res, Err(HyperSigError::InvalidSignature(_))));
  println!("Tampered request is rejected");
}

#[tokio::main]
async fn main() {
  scenario_single_signature().await;
  println!("-------------------------------------------------------------");
  scenario_tampered_query().await;
  println!("-------------------------------------------------------------");
}
