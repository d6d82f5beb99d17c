//! Activation notification collaborator (email delivery lives elsewhere).

use std::sync::Arc;

use async_trait::async_trait;

use carehub_core::Email;

/// What the registrant needs in order to activate their tenant.
#[derive(Debug, Clone)]
pub struct ActivationNotice {
    pub hospital_name: String,
    pub email: Email,
    pub activation_link: String,
}

/// Fire-and-forget delivery of activation notices.
///
/// Failures are the notifier's problem: registration has already committed
/// and never fails because a notice could not be delivered.
#[async_trait]
pub trait ActivationNotifier: Send + Sync {
    async fn notify(&self, notice: ActivationNotice);
}

#[async_trait]
impl<N> ActivationNotifier for Arc<N>
where
    N: ActivationNotifier + ?Sized,
{
    async fn notify(&self, notice: ActivationNotice) {
        (**self).notify(notice).await
    }
}

/// Records notices in the structured log instead of sending them.
///
/// The link itself is a credential, so only the recipient is logged.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

#[async_trait]
impl ActivationNotifier for TracingNotifier {
    async fn notify(&self, notice: ActivationNotice) {
        tracing::info!(
            hospital = %notice.hospital_name,
            recipient = %notice.email,
            "activation notice queued"
        );
    }
}
