//! Fixture seeding flow.
//!
//! Replays the demo fixture set against a freshly installed portal: two API
//! products (Talker and Economy), five backend APIs with their mapping
//! rules, a proxy policy chain, an application plan, and a member user.
//! The flow is linear; the first failing call aborts the run.

use console::style;
use serde_json::{json, Value};
use tracing::info;

use porta_api::ApiClient;
use porta_core::config::AppConfig;
use porta_core::error::{PortaError, PortaResult};

use super::ConnectionOpts;

/// Mapping-rule patterns exposed by the DBnomics backend.
const DBNOMICS_PATTERNS: [&str; 9] = [
    "/datasets/{provider_code}",
    "/datasets/{provider_code}/{dataset_code}",
    "/last-updates",
    "/providers",
    "/providers/{provider_code}",
    "/search",
    "/series",
    "/series/{provider_code}/{dataset_code}",
    "/series/{provider_code}/{dataset_code}/{series_code}",
];

pub fn run(config: &AppConfig, opts: &ConnectionOpts) -> PortaResult<()> {
    let api = super::create_api_client(config, opts)?;
    seed_portal(&api)?;
    println!("{} portal seeded", style("done:").green().bold());
    Ok(())
}

/// Drive the whole fixture set through the generic verb methods.
pub fn seed_portal(api: &ApiClient) -> PortaResult<()> {
    let empty = json!({});

    step("Renaming the default API product to Talker");
    let talker = first_record_id(&api.get("services.json", &empty)?, "services", "service")?;
    api.put(&format!("services/{talker}.json"), &json!({"name": "Talker"}))?;
    delete_catch_all_rule(api, talker)?;

    step("Turning the default backend into the Echo API, mounted at /echo");
    let echo = first_record_id(
        &api.get("backend_apis.json", &empty)?,
        "backend_apis",
        "backend_api",
    )?;
    api.put(
        &format!("backend_apis/{echo}.json"),
        &json!({"name": "Echo API", "private_endpoint": "https://echo-api.3scale.net:443"}),
    )?;
    let echo_hits = backend_hits_metric(api, echo)?;
    for pattern in ["/hello", "/say/{something}", "/bye"] {
        add_backend_mapping_rule(api, echo, pattern, echo_hits)?;
    }
    // The default backend is already mounted; only its path changes.
    let usages = api.get(&format!("services/{talker}/backend_usages.json"), &empty)?;
    let echo_usage = record_id(&usages[0], "backend_usage")?;
    api.put(
        &format!("services/{talker}/backend_usages/{echo_usage}.json"),
        &json!({"path": "/echo"}),
    )?;

    step("Creating the Quotes API backend, mounted at /quotes");
    let quotes = create_backend(api, "Quotes API", "https://quotes.rest:443")?;
    let quotes_hits = backend_hits_metric(api, quotes)?;
    add_backend_mapping_rule(api, quotes, "/qod", quotes_hits)?;
    mount_backend(api, talker, quotes, "/quotes")?;

    step("Creating the Ipsum Lorem API backend, mounted at /bs");
    let ipsum = create_backend(api, "Ipsum Lorem API", "https://randommer.io:443/api/Text/LoremIpsum")?;
    let ipsum_hits = backend_hits_metric(api, ipsum)?;
    add_backend_mapping_rule(api, ipsum, "/", ipsum_hits)?;
    mount_backend(api, talker, ipsum, "/bs")?;

    // Product-level rule so /bs resolves without a trailing slash.
    let talker_hits = first_record_id(
        &api.get(&format!("services/{talker}/metrics.json"), &empty)?,
        "metrics",
        "metric",
    )?;
    api.post(
        &format!("services/{talker}/proxy/mapping_rules.json"),
        &json!({"http_method": "GET", "pattern": "/bs", "metric_id": talker_hits, "delta": 1}),
    )?;

    step("Installing the Talker policy chain and deploying to staging");
    install_talker_policies(api, talker)?;
    api.post(&format!("/admin/api/services/{talker}/proxy/deploy.json"), &empty)?;

    step("Creating the Economy product with an Enterprise plan");
    let economy = record_id(&api.post("services.json", &json!({"name": "Economy"}))?, "service")?;
    api.post(
        &format!("/admin/api/services/{economy}/application_plans.json"),
        &json!({"name": "Enterprise", "setup_fee": 100, "cost_per_month": 17}),
    )?;
    delete_catch_all_rule(api, economy)?;

    step("Creating the DBnomics API backend, mounted at /");
    let dbnomics = create_backend(api, "DBnomics API", "https://api.db.nomics.world/v22")?;
    let dbnomics_hits = backend_hits_metric(api, dbnomics)?;
    for pattern in DBNOMICS_PATTERNS {
        add_backend_mapping_rule(api, dbnomics, pattern, dbnomics_hits)?;
    }
    mount_backend(api, economy, dbnomics, "/")?;

    step("Creating the OCDE Database backend, mounted at /ocde");
    let ocde = create_backend(api, "OCDE Database", "http://stats.oecd.org/SDMX-JSON/data")?;
    let ocde_hits = backend_hits_metric(api, ocde)?;
    add_backend_mapping_rule(api, ocde, "/{dataset}/{filter}/{agency}", ocde_hits)?;
    mount_backend(api, economy, ocde, "/ocde")?;
    api.post(&format!("/admin/api/services/{economy}/proxy/deploy.json"), &empty)?;

    step("Creating the member user scoped to the Economy product");
    let member = record_id(
        &api.post(
            "/admin/api/users.json",
            &json!({"username": "member", "email": "member@provider.example.com", "password": "p"}),
        )?,
        "user",
    )?;
    api.put(&format!("/admin/api/users/{member}/activate.json"), &empty)?;
    api.put(&format!("/admin/api/users/{member}/member.json"), &empty)?;
    api.put(
        &format!("/admin/api/users/{member}/permissions.json"),
        &json!({
            "allowed_sections": ["partners", "monitoring", "plans", "policy_registry"],
            "allowed_service_ids": [economy]
        }),
    )?;

    info!("fixture seeding complete");
    Ok(())
}

fn step(message: &str) {
    println!("{} {message}", style("==>").cyan().bold());
}

/// Dig the numeric `id` out of a `{"<wrapper>": {"id": ...}}` record.
fn record_id(value: &Value, wrapper: &str) -> PortaResult<u64> {
    value[wrapper]["id"]
        .as_u64()
        .ok_or_else(|| PortaError::Decode(format!("missing {wrapper} id in {value}")))
}

/// Dig the id of the first record out of a `{"<list>": [{"<wrapper>": ...}]}`
/// collection response.
fn first_record_id(value: &Value, list: &str, wrapper: &str) -> PortaResult<u64> {
    record_id(&value[list][0], wrapper)
}

fn create_backend(api: &ApiClient, name: &str, private_endpoint: &str) -> PortaResult<u64> {
    let created = api.post(
        "backend_apis.json",
        &json!({"name": name, "private_endpoint": private_endpoint}),
    )?;
    record_id(&created, "backend_api")
}

/// A backend's first metric is its hits metric.
fn backend_hits_metric(api: &ApiClient, backend: u64) -> PortaResult<u64> {
    let metrics = api.get(&format!("backend_apis/{backend}/metrics.json"), &json!({}))?;
    first_record_id(&metrics, "metrics", "metric")
}

fn add_backend_mapping_rule(
    api: &ApiClient,
    backend: u64,
    pattern: &str,
    metric: u64,
) -> PortaResult<Value> {
    api.post(
        &format!("backend_apis/{backend}/mapping_rules.json"),
        &json!({"http_method": "GET", "pattern": pattern, "metric_id": metric, "delta": 1}),
    )
}

fn mount_backend(api: &ApiClient, service: u64, backend: u64, path: &str) -> PortaResult<Value> {
    api.post(
        &format!("services/{service}/backend_usages.json"),
        &json!({"backend_api_id": backend, "path": path}),
    )
}

/// New products come with a catch-all proxy rule; remove it if present.
fn delete_catch_all_rule(api: &ApiClient, service: u64) -> PortaResult<()> {
    let rules = api.get(&format!("services/{service}/proxy/mapping_rules.json"), &json!({}))?;
    if let Some(rule) = rules["mapping_rules"][0]["mapping_rule"]["id"].as_u64() {
        api.delete(
            &format!("services/{service}/proxy/mapping_rules/{rule}.json"),
            &json!({}),
        )?;
    }
    Ok(())
}

/// The policies endpoint takes the chain as a JSON string parameter.
fn install_talker_policies(api: &ApiClient, service: u64) -> PortaResult<()> {
    let chain = json!([
        {
            "name": "headers",
            "version": "builtin",
            "configuration": {
                "request": [
                    {
                        "value_type": "plain",
                        "op": "set",
                        "header": "X-Api-Key",
                        "value": "2139d0df317449a1bae887111b26cfd9"
                    }
                ]
            },
            "enabled": true
        },
        {
            "name": "url_rewriting",
            "version": "builtin",
            "configuration": {
                "query_args_commands": [
                    {"value_type": "plain", "op": "set", "arg": "loremType", "value": "normal"},
                    {"value_type": "plain", "op": "set", "arg": "type", "value": "paragraphs"},
                    {"value_type": "plain", "op": "set", "arg": "number", "value": "1"}
                ]
            },
            "enabled": true
        },
        {
            "name": "apicast",
            "version": "builtin",
            "configuration": {},
            "enabled": true
        }
    ]);
    api.put(
        &format!("/admin/api/services/{service}/proxy/policies.json"),
        &json!({"policies_config": chain.to_string()}),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, VecDeque};
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};

    use axum::body::Bytes;
    use axum::extract::State;
    use axum::http::{Method, StatusCode, Uri};
    use axum::Router;

    use porta_core::config::AdminConfig;

    /// Portal serving scripted replies keyed by method and path. Repeated
    /// calls pop queued replies; exhausted or unknown keys get an empty body.
    #[derive(Clone, Default)]
    struct ScriptedPortal {
        replies: Arc<Mutex<HashMap<(String, String), VecDeque<String>>>>,
        calls: Arc<Mutex<Vec<(String, String, String)>>>,
    }

    impl ScriptedPortal {
        fn reply(&self, method: &str, path: &str, body: &str) {
            self.replies
                .lock()
                .unwrap()
                .entry((method.to_string(), path.to_string()))
                .or_default()
                .push_back(body.to_string());
        }

        fn calls(&self) -> Vec<(String, String, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    async fn respond(
        State(portal): State<ScriptedPortal>,
        method: Method,
        uri: Uri,
        body: Bytes,
    ) -> (StatusCode, String) {
        let key = (method.to_string(), uri.path().to_string());
        portal.calls.lock().unwrap().push((
            key.0.clone(),
            key.1.clone(),
            String::from_utf8_lossy(&body).into_owned(),
        ));

        let mut replies = portal.replies.lock().unwrap();
        let reply = match replies.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) => queue.front().cloned().unwrap_or_default(),
            None => String::new(),
        };
        (StatusCode::OK, reply)
    }

    fn start(portal: ScriptedPortal) -> SocketAddr {
        let app = Router::new().fallback(respond).with_state(portal);

        let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = std_listener.local_addr().unwrap();
        std_listener.set_nonblocking(true).unwrap();

        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async {
                let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
                axum::serve(listener, app).await
            })
            .unwrap();
        });

        addr
    }

    fn script_full_flow(portal: &ScriptedPortal) {
        // Talker product (id 2) and its catch-all rule.
        portal.reply(
            "GET",
            "/admin/api/services.json",
            r#"{"services":[{"service":{"id":2,"name":"API"}}]}"#,
        );
        portal.reply(
            "GET",
            "/admin/api/services/2/proxy/mapping_rules.json",
            r#"{"mapping_rules":[{"mapping_rule":{"id":11}}]}"#,
        );

        // Default backend (id 61) repurposed as the Echo API.
        portal.reply(
            "GET",
            "/admin/api/backend_apis.json",
            r#"{"backend_apis":[{"backend_api":{"id":61}}]}"#,
        );
        portal.reply(
            "GET",
            "/admin/api/backend_apis/61/metrics.json",
            r#"{"metrics":[{"metric":{"id":871}}]}"#,
        );
        portal.reply(
            "GET",
            "/admin/api/services/2/backend_usages.json",
            r#"[{"backend_usage":{"id":5}}]"#,
        );

        // Created backends, in creation order: Quotes, Ipsum, DBnomics, OCDE.
        for id in [62, 63, 64, 65] {
            portal.reply(
                "POST",
                "/admin/api/backend_apis.json",
                &format!(r#"{{"backend_api":{{"id":{id}}}}}"#),
            );
            portal.reply(
                "GET",
                &format!("/admin/api/backend_apis/{id}/metrics.json"),
                &format!(r#"{{"metrics":[{{"metric":{{"id":{}}}}}]}}"#, id + 810),
            );
        }

        // Talker hits metric and the Economy product (id 3).
        portal.reply(
            "GET",
            "/admin/api/services/2/metrics.json",
            r#"{"metrics":[{"metric":{"id":801}}]}"#,
        );
        portal.reply(
            "POST",
            "/admin/api/services.json",
            r#"{"service":{"id":3,"name":"Economy"}}"#,
        );
        portal.reply(
            "GET",
            "/admin/api/services/3/proxy/mapping_rules.json",
            r#"{"mapping_rules":[{"mapping_rule":{"id":12}}]}"#,
        );

        // Member user.
        portal.reply("POST", "/admin/api/users.json", r#"{"user":{"id":9}}"#);
    }

    fn client_for(addr: SocketAddr) -> ApiClient {
        let config = AdminConfig {
            endpoint: format!("http://{addr}/admin/api"),
            access_token: "secret".into(),
            accept_invalid_certs: false,
        };
        ApiClient::new(&config, None).unwrap()
    }

    #[test]
    fn seed_flow_replays_the_fixture_script() {
        let portal = ScriptedPortal::default();
        script_full_flow(&portal);
        let addr = start(portal.clone());

        seed_portal(&client_for(addr)).unwrap();

        let calls = portal.calls();
        let sequence: Vec<(&str, &str)> = calls
            .iter()
            .map(|(m, p, _)| (m.as_str(), p.as_str()))
            .collect();

        // Opening segment: rename, catch-all removal, Echo API setup.
        assert_eq!(
            &sequence[..12],
            &[
                ("GET", "/admin/api/services.json"),
                ("PUT", "/admin/api/services/2.json"),
                ("GET", "/admin/api/services/2/proxy/mapping_rules.json"),
                ("DELETE", "/admin/api/services/2/proxy/mapping_rules/11.json"),
                ("GET", "/admin/api/backend_apis.json"),
                ("PUT", "/admin/api/backend_apis/61.json"),
                ("GET", "/admin/api/backend_apis/61/metrics.json"),
                ("POST", "/admin/api/backend_apis/61/mapping_rules.json"),
                ("POST", "/admin/api/backend_apis/61/mapping_rules.json"),
                ("POST", "/admin/api/backend_apis/61/mapping_rules.json"),
                ("GET", "/admin/api/services/2/backend_usages.json"),
                ("PUT", "/admin/api/services/2/backend_usages/5.json"),
            ]
        );

        // Closing segment: member user creation and scoping.
        assert_eq!(
            &sequence[sequence.len() - 4..],
            &[
                ("POST", "/admin/api/users.json"),
                ("PUT", "/admin/api/users/9/activate.json"),
                ("PUT", "/admin/api/users/9/member.json"),
                ("PUT", "/admin/api/users/9/permissions.json"),
            ]
        );

        // Every fixture call went out, none twice.
        assert_eq!(calls.len(), 49);

        // Rename payload.
        assert_eq!(calls[1].2, r#"{"name":"Talker"}"#);

        // First Echo API mapping rule.
        let rule: Value = serde_json::from_str(&calls[7].2).unwrap();
        assert_eq!(
            rule,
            json!({"http_method": "GET", "pattern": "/hello", "metric_id": 871, "delta": 1})
        );

        // The policy chain travels as a JSON string parameter.
        let policies_call = calls
            .iter()
            .find(|(_, p, _)| p.ends_with("/proxy/policies.json"))
            .unwrap();
        let body: Value = serde_json::from_str(&policies_call.2).unwrap();
        let chain: Value =
            serde_json::from_str(body["policies_config"].as_str().unwrap()).unwrap();
        assert_eq!(chain[0]["name"], "headers");
        assert_eq!(chain[1]["name"], "url_rewriting");
        assert_eq!(chain[2]["name"], "apicast");

        // Member permissions are scoped to the Economy product.
        let permissions: Value = serde_json::from_str(&calls[calls.len() - 1].2).unwrap();
        assert_eq!(permissions["allowed_service_ids"], json!([3]));
        assert_eq!(
            permissions["allowed_sections"],
            json!(["partners", "monitoring", "plans", "policy_registry"])
        );
    }

    #[test]
    fn seed_flow_skips_missing_catch_all_rule() {
        let portal = ScriptedPortal::default();
        script_full_flow(&portal);
        // Talker has no catch-all rule this time.
        portal
            .replies
            .lock()
            .unwrap()
            .insert(
                ("GET".into(), "/admin/api/services/2/proxy/mapping_rules.json".into()),
                VecDeque::from([r#"{"mapping_rules":[]}"#.to_string()]),
            );
        let addr = start(portal.clone());

        seed_portal(&client_for(addr)).unwrap();

        let deletes: Vec<_> = portal
            .calls()
            .iter()
            .filter(|(m, p, _)| m == "DELETE" && p.contains("/services/2/"))
            .cloned()
            .collect();
        assert!(deletes.is_empty(), "no rule to delete for the Talker product");
    }
}
