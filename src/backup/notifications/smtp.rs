use crate::backup::backup_config::EmailConfig;
use crate::backup::credential::{Credential, CredentialStore};
use crate::backup::function_path;
use crate::backup::notifications::Notification;
use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use crate::backup::result_error::{WithDebugObjectAndFnName, WithMsg};
use function_name::named;
use lettre::message::header::ContentType;
use lettre::{Message, SmtpTransport, Transport};
use std::fmt::Display;

/// Sends the report as a plain text email over SMTP
///
/// The credential is loaded from `credentialFile` on every send, so the
/// secret only lives in memory while the mail is being delivered.
/// With `useSsl` the connection is upgraded with STARTTLS, otherwise the
/// message is sent over a plain connection.
#[derive(Clone, Debug)]
pub struct SmtpNotification<C> {
    config: EmailConfig,
    credential_store: C,
}

impl<C: CredentialStore> SmtpNotification<C> {
    pub fn new(config: EmailConfig, credential_store: C) -> Self {
        Self {
            config,
            credential_store,
        }
    }

    #[named]
    pub fn build_message<D1: Display, D2: Display>(&self, topic: D1, msg: D2) -> Result<Message> {
        self.config
            .to()
            .iter()
            .fold(Message::builder(), |email, send_to| {
                email.to(send_to.clone())
            })
            .from(self.config.from().clone())
            .subject(topic.to_string())
            .header(ContentType::TEXT_PLAIN)
            .body(msg.to_string())
            .map_err(Error::from)
            .with_msg(format!(
                "Fail to build notification email from {:?} to {:?}",
                self.config.from(),
                self.config.to()
            ))
            .with_debug_object_and_fn_name(self.config.smtp_server().clone(), function_path!())
    }

    /// Delivers through any lettre transport. Every transport failure is
    /// reported as [`Error::MailSendFailed`].
    pub fn send_with<T, D1, D2>(&self, transport: &T, topic: D1, msg: D2) -> Result<()>
    where
        T: Transport,
        T::Error: Display,
        D1: Display,
        D2: Display,
    {
        let email = self.build_message(topic, msg)?;

        tracing::info!("Sending email...");
        transport
            .send(&email)
            .map(|_| ())
            .map_err(|e| Error::MailSendFailed(e.to_string()))
    }

    #[named]
    fn transport(&self, credential: &Credential) -> Result<SmtpTransport> {
        let host = self.config.smtp_server().as_str();
        let builder = if *self.config.use_ssl() {
            SmtpTransport::starttls_relay(host)
                .map_err(Error::from)
                .with_msg(format!("Failed to build smtp client for host: {:?}", host))
                .with_debug_object_and_fn_name(host.to_string(), function_path!())?
        } else {
            SmtpTransport::builder_dangerous(host)
        };

        Ok(builder
            .port(*self.config.smtp_port())
            .credentials(credential.into())
            .build())
    }
}

impl<C: CredentialStore> Notification for SmtpNotification<C> {
    fn send<D1: Display, D2: Display>(&self, topic: D1, msg: D2) -> Result<()> {
        tracing::info!(
            "Started smtp email notification from {:?} to {:?} via {}:{}",
            self.config.from(),
            self.config.to(),
            self.config.smtp_server(),
            self.config.smtp_port()
        );
        let credential = self
            .credential_store
            .load_credential(self.config.credential_file())?;
        let mailer = self.transport(&credential)?;
        self.send_with(&mailer, topic, msg)
    }
}
