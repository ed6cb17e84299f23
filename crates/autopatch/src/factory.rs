//! Wiring of the concrete executor, package manager and notification channels

use std::sync::Arc;

use autopatch_core::RunContext;
use autopatch_exec::CommandExecutor;
use autopatch_notify::{Dispatcher, EmailChannel, SlackWebhook, SmtpMailer};
use autopatch_pkg::{AptManager, DistroFamily, PackageManager, YumManager};

/// Determine if package commands must go through sudo (not running as root)
pub async fn needs_sudo(executor: &dyn CommandExecutor) -> bool {
    let uid = executor.run("id", &["-u"]).await;
    let use_sudo = uid
        .as_ref()
        .map(|r| !(r.success() && r.stdout.trim() == "0"))
        .unwrap_or(true);

    tracing::debug!(use_sudo, "resolved privilege mode");
    use_sudo
}

/// Fully qualified host name, falling back to `short`
///
/// Reports and the mail sender name carry the domain, as `hostname --fqdn`
/// resolves it.
pub async fn fqdn(executor: &dyn CommandExecutor, short: String) -> String {
    match executor.run("hostname", &["--fqdn"]).await {
        Ok(r) if r.success() && !r.stdout.trim().is_empty() => r.stdout.trim().to_string(),
        Ok(r) => {
            tracing::debug!(status = r.status, "hostname --fqdn failed, using short name");
            short
        }
        Err(e) => {
            tracing::debug!(error = %e, "hostname unavailable, using short name");
            short
        }
    }
}

/// Package manager adapter for a distribution family
pub fn package_manager(
    family: DistroFamily,
    executor: Arc<dyn CommandExecutor>,
    use_sudo: bool,
) -> Arc<dyn PackageManager> {
    match family {
        DistroFamily::Debian => {
            tracing::info!(use_sudo, "using apt package manager");
            Arc::new(AptManager::new(executor, use_sudo))
        }
        DistroFamily::Rpm => {
            tracing::info!(use_sudo, "using yum package manager");
            Arc::new(YumManager::new(executor, use_sudo))
        }
    }
}

/// Webhook primary with SMTP mail fallback
pub fn dispatcher(ctx: &RunContext) -> Dispatcher {
    let config = &ctx.config;
    let webhook = SlackWebhook::new(config.webhook_url.clone());
    let mail = EmailChannel::new(
        SmtpMailer::new(&config.smtp_host, config.smtp_port),
        config.recipients.clone(),
        config.sender_address(&ctx.hostname),
    );

    Dispatcher::new(Box::new(webhook), Box::new(mail))
}
