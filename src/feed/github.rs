use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, trace};

use crate::{
    feed::{format_timestamp, CanonicalEvent},
    webhooks::github::{PullRequestEvent, PushEvent, HEAD_COMMIT_KEY, PULL_REQUEST_KEY},
};

#[derive(Debug, PartialEq)]
pub enum Normalized {
    Record(CanonicalEvent),
    /// A pull request event whose action isn't tracked by the feed.
    Ignored {
        action: String,
    },
    Unsupported,
}

#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("no data in webhook payload")]
    NoData,
    #[error("malformed {event} payload: {source}")]
    Malformed {
        event: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Turns a webhook payload into the record stored in the feed, stamping it with `captured_at`.
///
/// Pull request payloads take precedence over push payloads. Once the shape is recognized every
/// field the record needs must be present, otherwise the payload is [`NormalizeError::Malformed`].
pub fn normalize(payload: &Value, captured_at: DateTime<Utc>) -> Result<Normalized, NormalizeError> {
    if is_empty(payload) {
        return Err(NormalizeError::NoData);
    }

    if payload.get(PULL_REQUEST_KEY).is_some() {
        let event = PullRequestEvent::deserialize(payload).map_err(|source| {
            NormalizeError::Malformed {
                event: "pull request",
                source,
            }
        })?;
        return Ok(handle_pull_request(event, captured_at));
    }

    if payload.get(HEAD_COMMIT_KEY).is_some() {
        let event = PushEvent::deserialize(payload).map_err(|source| NormalizeError::Malformed {
            event: "push",
            source,
        })?;
        return Ok(handle_push(event, captured_at));
    }

    trace!("payload has neither a pull request nor a head commit");
    Ok(Normalized::Unsupported)
}

fn handle_pull_request(event: PullRequestEvent, captured_at: DateTime<Utc>) -> Normalized {
    let pr = event.pull_request;
    let merged = pr.is_merged();

    let build = match event.action.as_str() {
        "opened" => CanonicalEvent::pull_request,
        "closed" if merged => CanonicalEvent::merge,
        _ => {
            debug!(
                "ignoring pull request #{} with action `{}` (merged: {})",
                pr.id, event.action, merged
            );
            return Normalized::Ignored {
                action: event.action.clone(),
            };
        }
    };

    Normalized::Record(build(
        pr.user.login,
        pr.head.r#ref,
        pr.base.r#ref,
        pr.id,
        format_timestamp(captured_at),
    ))
}

fn handle_push(event: PushEvent, captured_at: DateTime<Utc>) -> Normalized {
    let branch = event.branch().to_owned();
    let commit = event.head_commit;

    Normalized::Record(CanonicalEvent::push(
        commit.author.name,
        branch,
        commit.id,
        format_timestamp(captured_at),
    ))
}

/// Payloads GitHub would never send: `null`, `false`, `0`, `""`, `[]` and `{}`.
fn is_empty(payload: &Value) -> bool {
    match payload {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use crate::feed::EventAction;

    use super::*;

    const STAMP: &str = "05 March 2024 - 02:30 PM UTC";

    fn captured_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap()
    }

    fn pull_request_payload(action: &str, merged: Value) -> Value {
        json!({
            "action": action,
            "number": 7,
            "pull_request": {
                "id": 1_296_269_u64,
                "number": 7,
                "title": "Add webhook feed",
                "user": { "login": "octocat", "id": 1 },
                "head": { "ref": "feature/feed", "sha": "6dcb09b" },
                "base": { "ref": "main", "sha": "9049f12" },
                "merged": merged,
            },
        })
    }

    fn record(normalized: Normalized) -> CanonicalEvent {
        match normalized {
            Normalized::Record(event) => event,
            other => panic!("expected a record, got {:?}", other),
        }
    }

    #[test]
    fn test_opened_pull_request() {
        let payload = pull_request_payload("opened", json!(false));
        let event = record(normalize(&payload, captured_at()).unwrap());

        assert_eq!(event.action, EventAction::PullRequest);
        assert_eq!(event.author, "octocat");
        assert_eq!(event.from_branch.as_deref(), Some("feature/feed"));
        assert_eq!(event.to_branch, "main");
        assert_eq!(event.request_id, "1296269");
        assert_eq!(event.timestamp, STAMP);
        assert_eq!(
            event.message,
            format!(
                "octocat submitted a pull request from feature/feed to main on {}",
                STAMP
            )
        );
    }

    #[test]
    fn test_merged_pull_request() {
        let payload = pull_request_payload("closed", json!(true));
        let event = record(normalize(&payload, captured_at()).unwrap());

        assert_eq!(event.action, EventAction::Merge);
        assert_eq!(event.from_branch.as_deref(), Some("feature/feed"));
        assert_eq!(event.to_branch, "main");
        assert_eq!(event.request_id, "1296269");
        assert_eq!(
            event.message,
            format!("octocat merged branch feature/feed to main on {}", STAMP)
        );
    }

    #[test]
    fn test_closed_without_merge_is_ignored() {
        for merged in [json!(false), Value::Null] {
            let payload = pull_request_payload("closed", merged);
            assert_eq!(
                normalize(&payload, captured_at()).unwrap(),
                Normalized::Ignored {
                    action: "closed".to_string()
                }
            );
        }

        let mut payload = pull_request_payload("closed", Value::Null);
        payload["pull_request"]
            .as_object_mut()
            .unwrap()
            .remove("merged");
        assert!(matches!(
            normalize(&payload, captured_at()).unwrap(),
            Normalized::Ignored { .. }
        ));
    }

    #[test]
    fn test_other_pull_request_actions_are_ignored() {
        for action in ["edited", "synchronize", "reopened", "labeled"] {
            let payload = pull_request_payload(action, json!(true));
            assert_eq!(
                normalize(&payload, captured_at()).unwrap(),
                Normalized::Ignored {
                    action: action.to_string()
                }
            );
        }
    }

    #[test]
    fn test_push() {
        let payload = json!({
            "ref": "refs/heads/main",
            "head_commit": { "id": "abc123", "author": { "name": "alice" } },
        });
        let event = record(normalize(&payload, captured_at()).unwrap());

        assert_eq!(event.action, EventAction::Push);
        assert_eq!(event.author, "alice");
        assert_eq!(event.from_branch, None);
        assert_eq!(event.to_branch, "main");
        assert_eq!(event.request_id, "abc123");
        assert_eq!(event.message, format!("alice pushed to main on {}", STAMP));
    }

    #[test]
    fn test_push_keeps_last_ref_segment() {
        let payload = json!({
            "ref": "refs/heads/release/v2",
            "head_commit": { "id": "f00d", "author": { "name": "bob" } },
        });
        let event = record(normalize(&payload, captured_at()).unwrap());
        assert_eq!(event.to_branch, "v2");

        let payload = json!({
            "ref": "main",
            "head_commit": { "id": "f00d", "author": { "name": "bob" } },
        });
        let event = record(normalize(&payload, captured_at()).unwrap());
        assert_eq!(event.to_branch, "main");
    }

    #[test]
    fn test_pull_request_wins_over_head_commit() {
        let mut payload = pull_request_payload("opened", json!(false));
        payload["ref"] = json!("refs/heads/main");
        payload["head_commit"] = json!({ "id": "abc123", "author": { "name": "alice" } });

        let event = record(normalize(&payload, captured_at()).unwrap());
        assert_eq!(event.action, EventAction::PullRequest);
    }

    #[test]
    fn test_unsupported() {
        let payload = json!({ "zen": "Keep it logically awesome.", "hook_id": 1 });
        assert_eq!(
            normalize(&payload, captured_at()).unwrap(),
            Normalized::Unsupported
        );

        assert_eq!(
            normalize(&json!([1, 2]), captured_at()).unwrap(),
            Normalized::Unsupported
        );
    }

    #[test]
    fn test_empty_payloads() {
        for payload in [
            Value::Null,
            json!({}),
            json!([]),
            json!(""),
            json!(0),
            json!(false),
        ] {
            assert!(
                matches!(
                    normalize(&payload, captured_at()),
                    Err(NormalizeError::NoData)
                ),
                "{} should carry no data",
                payload
            );
        }
    }

    #[test]
    fn test_missing_fields_are_malformed() {
        let mut payload = pull_request_payload("opened", json!(false));
        payload["pull_request"]["user"]
            .as_object_mut()
            .unwrap()
            .remove("login");
        assert!(matches!(
            normalize(&payload, captured_at()),
            Err(NormalizeError::Malformed {
                event: "pull request",
                ..
            })
        ));

        // fields are checked before the action is
        let mut payload = pull_request_payload("edited", json!(false));
        payload["pull_request"]
            .as_object_mut()
            .unwrap()
            .remove("head");
        assert!(matches!(
            normalize(&payload, captured_at()),
            Err(NormalizeError::Malformed { .. })
        ));

        let payload = json!({ "ref": "refs/heads/main", "head_commit": null });
        assert!(matches!(
            normalize(&payload, captured_at()),
            Err(NormalizeError::Malformed { event: "push", .. })
        ));

        let payload = json!({ "head_commit": { "id": "abc123", "author": { "name": "alice" } } });
        assert!(matches!(
            normalize(&payload, captured_at()),
            Err(NormalizeError::Malformed { event: "push", .. })
        ));
    }

    #[test]
    fn test_loosely_typed_fields_are_malformed() {
        let mut payload = pull_request_payload("opened", json!(false));
        payload["pull_request"]["id"] = json!("1296269");
        assert!(matches!(
            normalize(&payload, captured_at()),
            Err(NormalizeError::Malformed { .. })
        ));

        let payload = pull_request_payload("closed", json!("yes"));
        assert!(matches!(
            normalize(&payload, captured_at()),
            Err(NormalizeError::Malformed { .. })
        ));

        let payload = json!({
            "ref": "refs/heads/main",
            "head_commit": { "id": 123, "author": { "name": "alice" } },
        });
        assert!(matches!(
            normalize(&payload, captured_at()),
            Err(NormalizeError::Malformed { event: "push", .. })
        ));
    }
}
