use super::*;

fn response(json: &str) -> CdpResponse {
    serde_json::from_str(json).unwrap()
}

#[tokio::test]
async fn test_pending_resolves_result() {
    let pending = PendingRequests::default();
    let rx = pending.register(1);

    pending.resolve(response(r#"{"id": 1, "result": {"frameId": "F1"}}"#));

    let value = rx.await.unwrap().unwrap();
    assert_eq!(value["frameId"], "F1");
}

#[tokio::test]
async fn test_pending_resolves_protocol_error() {
    let pending = PendingRequests::default();
    let rx = pending.register(2);

    pending.resolve(response(
        r#"{"id": 2, "error": {"code": -32000, "message": "Cannot navigate to invalid URL"}}"#,
    ));

    match rx.await.unwrap() {
        Err(CdpError::Protocol { code, message }) => {
            assert_eq!(code, -32000);
            assert!(message.contains("invalid URL"));
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[tokio::test]
async fn test_pending_ignores_events_and_unknown_ids() {
    let pending = PendingRequests::default();
    let mut rx = pending.register(3);

    pending.resolve(response(r#"{"method": "Page.frameNavigated", "params": {}}"#));
    pending.resolve(response(r#"{"id": 99, "result": {}}"#));

    assert!(rx.try_recv().is_err());
    pending.resolve(response(r#"{"id": 3}"#));
    assert_eq!(rx.await.unwrap().unwrap(), Value::Null);
}

#[tokio::test]
async fn test_clear_closes_waiters() {
    let pending = PendingRequests::default();
    let rx = pending.register(4);

    pending.clear();

    assert!(rx.await.is_err());
}

#[tokio::test]
async fn test_forget_drops_sender() {
    let pending = PendingRequests::default();
    let rx = pending.register(5);

    pending.forget(5);
    pending.resolve(response(r#"{"id": 5, "result": {}}"#));

    assert!(rx.await.is_err());
}
