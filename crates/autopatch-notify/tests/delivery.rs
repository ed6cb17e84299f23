use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use chrono::Local;
use serde_json::Value;
use url::Url;

use autopatch_notify::{
    Category, Channel, DeliveryOutcome, DispatchOutcome, Dispatcher, EmailChannel, Mail,
    MailTransport, NotifyError, Report, SlackWebhook,
};

struct Hook {
    status: StatusCode,
    bodies: Mutex<Vec<Value>>,
}

async fn hook(State(hook): State<Arc<Hook>>, Json(body): Json<Value>) -> StatusCode {
    hook.bodies.lock().unwrap().push(body);
    hook.status
}

/// Start an in-process webhook answering every POST with `status`
async fn webhook_server(status: StatusCode) -> (Url, Arc<Hook>) {
    let state = Arc::new(Hook {
        status,
        bodies: Mutex::new(Vec::new()),
    });
    let app = Router::new()
        .route("/hook", post(hook))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (Url::parse(&format!("http://{addr}/hook")).unwrap(), state)
}

/// Mail transport recording each recipient it was asked to send to
#[derive(Default)]
struct RecordingMailer {
    unreachable: bool,
    fail_for: Option<String>,
    attempts: Arc<Mutex<Vec<String>>>,
    mails: Arc<Mutex<Vec<Mail>>>,
}

#[async_trait]
impl MailTransport for RecordingMailer {
    async fn test_connection(&self) -> Result<(), NotifyError> {
        if self.unreachable {
            return Err(NotifyError::SmtpUnreachable {
                server: "mail.example.com:25".to_string(),
                message: "connection refused".to_string(),
            });
        }
        Ok(())
    }

    async fn send(&self, recipient: &str, mail: &Mail) -> Result<(), NotifyError> {
        self.attempts.lock().unwrap().push(recipient.to_string());
        if self.fail_for.as_deref() == Some(recipient) {
            return Err(NotifyError::Recipient {
                recipient: recipient.to_string(),
                message: "550 mailbox unavailable".to_string(),
            });
        }
        self.mails.lock().unwrap().push(mail.clone());
        Ok(())
    }
}

fn recipients() -> Vec<String> {
    vec![
        "first@example.com".to_string(),
        "second@example.com".to_string(),
        "third@example.com".to_string(),
    ]
}

fn report() -> Report {
    Report::new(
        Local::now(),
        "db01.example.com",
        Category::InstallFailed,
        vec!["openssl".to_string(), "curl".to_string()],
    )
}

#[tokio::test]
async fn test_webhook_delivers_on_200() {
    let (url, hook) = webhook_server(StatusCode::OK).await;
    let webhook = SlackWebhook::new(url);

    let outcome = webhook.deliver(&report()).await;

    assert!(outcome.is_delivered());
    let bodies = hook.bodies.lock().unwrap();
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["attachments"][0]["title"], "db01.example.com");
    assert_eq!(bodies[0]["attachments"][0]["color"], "#ef0000");
}

#[tokio::test]
async fn test_webhook_non_200_is_failure() {
    // Any success code other than 200 still counts as not delivered
    for status in [StatusCode::SERVICE_UNAVAILABLE, StatusCode::NO_CONTENT] {
        let (url, _hook) = webhook_server(status).await;
        let webhook = SlackWebhook::new(url);

        match webhook.deliver(&report()).await {
            DeliveryOutcome::Failed(NotifyError::Status { status: got, .. }) => {
                assert_eq!(got, status.as_u16());
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_webhook_unreachable() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let webhook = SlackWebhook::new(Url::parse(&format!("http://{addr}/hook")).unwrap());

    match webhook.deliver(&report()).await {
        DeliveryOutcome::Failed(e) => assert!(e.is_unreachable()),
        DeliveryOutcome::Delivered => panic!("closed port accepted the report"),
    }
}

#[tokio::test]
async fn test_email_sends_to_each_recipient() {
    let mailer = RecordingMailer::default();
    let attempts = mailer.attempts.clone();
    let mails = mailer.mails.clone();
    let channel = EmailChannel::new(mailer, recipients(), "root@db01.example.com");

    assert!(channel.deliver(&report()).await.is_delivered());
    assert_eq!(*attempts.lock().unwrap(), recipients());

    let mails = mails.lock().unwrap();
    assert_eq!(
        mails[0].subject,
        "The following 2 updates have not been installed due to errors:"
    );
    assert_eq!(mails[0].from_name, "db01.example.com");
    assert_eq!(mails[0].to, recipients());
    assert!(mails[0].body.ends_with("openssl\ncurl"));
}

#[tokio::test]
async fn test_email_recipient_failure_is_fail_fast() {
    let mailer = RecordingMailer {
        fail_for: Some("second@example.com".to_string()),
        ..Default::default()
    };
    let attempts = mailer.attempts.clone();
    let channel = EmailChannel::new(mailer, recipients(), "root@db01.example.com");

    let outcome = channel.deliver(&report()).await;

    assert!(matches!(
        outcome,
        DeliveryOutcome::Failed(NotifyError::Recipient { ref recipient, .. })
            if recipient == "second@example.com"
    ));
    assert_eq!(
        *attempts.lock().unwrap(),
        vec!["first@example.com", "second@example.com"]
    );
}

#[tokio::test]
async fn test_email_unreachable_server_sends_nothing() {
    let mailer = RecordingMailer {
        unreachable: true,
        ..Default::default()
    };
    let attempts = mailer.attempts.clone();
    let channel = EmailChannel::new(mailer, recipients(), "root@db01.example.com");

    let outcome = channel.deliver(&report()).await;

    assert!(matches!(
        outcome,
        DeliveryOutcome::Failed(NotifyError::SmtpUnreachable { .. })
    ));
    assert!(attempts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_dispatch_primary_200_never_mails() {
    let (url, hook) = webhook_server(StatusCode::OK).await;
    let mailer = RecordingMailer::default();
    let attempts = mailer.attempts.clone();

    let dispatcher = Dispatcher::new(
        Box::new(SlackWebhook::new(url)),
        Box::new(EmailChannel::new(mailer, recipients(), "root@db01.example.com")),
    );

    let outcome = dispatcher.notify(&report()).await;

    assert!(matches!(outcome, DispatchOutcome::Primary));
    assert_eq!(hook.bodies.lock().unwrap().len(), 1);
    assert!(attempts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_dispatch_503_falls_back_and_stops_at_failing_recipient() {
    let (url, hook) = webhook_server(StatusCode::SERVICE_UNAVAILABLE).await;
    let mailer = RecordingMailer {
        fail_for: Some("second@example.com".to_string()),
        ..Default::default()
    };
    let attempts = mailer.attempts.clone();
    let mails = mailer.mails.clone();

    let dispatcher = Dispatcher::new(
        Box::new(SlackWebhook::new(url)),
        Box::new(EmailChannel::new(mailer, recipients(), "root@db01.example.com")),
    );

    let outcome = dispatcher.notify(&report()).await;

    assert!(matches!(
        outcome,
        DispatchOutcome::Undelivered {
            primary: NotifyError::Status { status: 503, .. },
            secondary: NotifyError::Recipient { .. },
        }
    ));
    assert_eq!(hook.bodies.lock().unwrap().len(), 1);
    assert_eq!(
        *attempts.lock().unwrap(),
        vec!["first@example.com", "second@example.com"]
    );
    // recipient 1 got the mail before the failure
    assert_eq!(mails.lock().unwrap().len(), 1);
}
