use twscreen_spider::mapping::{Prefix, Segment, StockMapping};
use twscreen_spider::rank;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// End-to-end runs of both pipeline halves against mocked endpoints.

fn big5_bytes(text: &str) -> Vec<u8> {
    let (bytes, _, had_errors) = encoding_rs::BIG5.encode(text);
    assert!(!had_errors, "fixture must be representable in Big5");
    bytes.into_owned()
}

#[tokio::test]
async fn mapping_builder_round_trip() {
    let server = MockServer::start().await;

    // the real page is served as Big5 with U+3000 between code and name
    let page = "<html><body><table class=\"h4\"><tbody>\
         <tr><td colspan=\"2\">有價證券代號及名稱</td></tr>\
         <tr><td>2330　台積電</td><td>TW0002330008</td></tr>\
         <tr><td>1101　台泥</td><td>TW0001101004</td></tr>\
         <tr><td>股票</td><td></td></tr>\
         </tbody></table></body></html>";

    Mock::given(method("GET"))
        .and(path("/isin/C_public.jsp"))
        .and(query_param("strMode", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(big5_bytes(page)))
        .mount(&server)
        .await;

    let segment = Segment {
        market: "TWSE",
        url: format!("{}/isin/C_public.jsp?strMode=2", server.uri()),
        prefix: Prefix::Twse,
        encoding: encoding_rs::BIG5,
    };

    let http_client = reqwest::Client::new();
    let mut mapping = StockMapping::default();
    let count = twscreen_spider::mapping::scrape_segment(&http_client, &segment, &mut mapping)
        .await
        .unwrap();

    assert_eq!(count, 2);
    let record = mapping.get("2330").unwrap();
    assert_eq!(record.name, "台積電");
    assert_eq!(record.prefix, Prefix::Twse);
    assert_eq!(record.market, "TWSE");

    // the persisted file is the contract with the screen step
    let dir = tempfile::tempdir().unwrap();
    let mapping_path = dir.path().join("stock_mapping.json");
    let mapping_path = mapping_path.to_str().unwrap();
    mapping.save(mapping_path).await.unwrap();
    let loaded = StockMapping::load(mapping_path).await.unwrap();
    assert_eq!(mapping, loaded);
}

#[tokio::test]
async fn missing_table_skips_segment() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/isin/C_public.jsp"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<html><body>maintenance</body></html>"),
        )
        .mount(&server)
        .await;

    let segment = Segment {
        market: "EMERGING",
        url: format!("{}/isin/C_public.jsp?strMode=5", server.uri()),
        prefix: Prefix::Tpex,
        encoding: encoding_rs::BIG5,
    };

    let http_client = reqwest::Client::new();
    let mut mapping = StockMapping::default();
    let count = twscreen_spider::mapping::scrape_segment(&http_client, &segment, &mut mapping)
        .await
        .unwrap();

    assert_eq!(count, 0);
    assert!(mapping.is_empty());
}

#[tokio::test]
async fn screen_pipeline_writes_both_outputs() {
    let server = MockServer::start().await;

    let body = "<script language=javascript>\
         parent.sStklistAll='2330,9999';\
         </script>";
    Mock::given(method("GET"))
        .and(path("/z/zk/zkf/zkResult.asp"))
        .and(query_param("D", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(big5_bytes(body)))
        .mount(&server)
        .await;

    let http_client = reqwest::Client::new();
    let base = format!("{}/z/zk/zkf/zkResult.asp", server.uri());
    let entries = rank::fetch_ranked_from(&http_client, &base, 1, 80)
        .await
        .unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].code, "2330");
    assert_eq!(entries[0].rs_rank, ">80");

    // only the mapped code survives into the persisted outputs
    let mut mapping = StockMapping::default();
    mapping.insert(
        "2330".to_string(),
        twscreen_spider::mapping::SecurityRecord {
            name: "台積電".to_string(),
            prefix: Prefix::Twse,
            market: "TWSE".to_string(),
        },
    );
    let results = rank::join(&entries, &mapping);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].code, "TWSE:2330");

    let dir = tempfile::tempdir().unwrap();
    let json_path = dir.path().join("filtered_stocks.json");
    let txt_path = dir.path().join("filtered_stocks.txt");
    let line = rank::persist(
        &results,
        json_path.to_str().unwrap(),
        txt_path.to_str().unwrap(),
    )
    .await
    .unwrap();

    assert_eq!(line, "TWSE:2330");
    assert_eq!(
        tokio::fs::read_to_string(&txt_path).await.unwrap(),
        "TWSE:2330"
    );
    let reloaded: Vec<rank::FilteredResult> =
        serde_json::from_str(&tokio::fs::read_to_string(&json_path).await.unwrap()).unwrap();
    assert_eq!(reloaded, results);
}

#[tokio::test]
async fn unreachable_ranking_service_yields_no_entries() {
    // nothing listens here; the fetch error degrades to an empty result
    // rather than aborting the run
    let http_client = reqwest::Client::new();
    let entries = rank::fetch_ranked_from(&http_client, "http://127.0.0.1:1/zkResult.asp", 1, 80)
        .await
        .unwrap();

    assert!(entries.is_empty());
}

#[tokio::test]
async fn screen_with_no_assignment_yields_no_entries() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/z/zk/zkf/zkResult.asp"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>查無資料</html>"))
        .mount(&server)
        .await;

    let http_client = reqwest::Client::new();
    let base = format!("{}/z/zk/zkf/zkResult.asp", server.uri());
    let entries = rank::fetch_ranked_from(&http_client, &base, 4, 90)
        .await
        .unwrap();

    assert!(entries.is_empty());
}
