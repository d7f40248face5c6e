use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::{error, info, instrument};

use crate::config::{ConfigError, EmailConfig};

/// Email service errors
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("SMTP error: {0}")]
    SmtpError(String),

    #[error("Message building error: {0}")]
    MessageError(String),

    #[error("Address error: {0}")]
    AddressError(String),
}

impl From<ConfigError> for EmailError {
    fn from(err: ConfigError) -> Self {
        EmailError::ConfigError(err.to_string())
    }
}

/// Outgoing mail surface used by the registration flow. Production wires
/// the SMTP implementation; tests and development substitute fakes.
#[async_trait]
pub trait EmailService: Send + Sync {
    async fn send_verification_email(
        &self,
        to: &str,
        user_name: &str,
        verify_url: &str,
    ) -> Result<(), EmailError>;
}

/// Email message builder
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text_body: Option<String>,
    pub html_body: Option<String>,
}

impl EmailMessage {
    pub fn new(to: String, subject: String) -> Self {
        Self {
            to,
            subject,
            text_body: None,
            html_body: None,
        }
    }

    pub fn with_text_body(mut self, body: String) -> Self {
        self.text_body = Some(body);
        self
    }

    pub fn with_html_body(mut self, body: String) -> Self {
        self.html_body = Some(body);
        self
    }
}

/// SMTP email service implementation
pub struct SmtpEmailService {
    pub config: EmailConfig,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpEmailService {
    /// Create a new SMTP email service
    #[instrument(skip(config), fields(host = %config.smtp_host, port = config.smtp_port))]
    pub fn new(config: EmailConfig) -> Result<Self, EmailError> {
        info!("Initializing SMTP email service");

        config.validate().map_err(EmailError::from)?;

        let mut transport_builder =
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
                .port(config.smtp_port)
                .timeout(Some(std::time::Duration::from_secs(
                    config.connection_timeout_secs,
                )));

        if config.use_tls {
            let tls_parameters = TlsParameters::new(config.smtp_host.clone())
                .map_err(|e| EmailError::ConfigError(format!("TLS configuration error: {}", e)))?;

            if config.use_starttls {
                transport_builder = transport_builder.tls(Tls::Required(tls_parameters));
            } else {
                transport_builder = transport_builder.tls(Tls::Wrapper(tls_parameters));
            }
        } else {
            transport_builder = transport_builder.tls(Tls::None);
        }

        if !config.smtp_username.is_empty() && !config.smtp_password.is_empty() {
            let credentials = Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            );
            transport_builder = transport_builder.credentials(credentials);
        }

        let transport = transport_builder.build();

        info!("SMTP email service initialized successfully");
        Ok(Self { config, transport })
    }

    /// Send an email message
    #[instrument(skip(self, message), fields(to = %message.to, subject = %message.subject))]
    pub async fn send_email(&self, message: EmailMessage) -> Result<(), EmailError> {
        info!("Sending email to: {}", message.to);

        let email_message = self.build_message(message)?;

        self.transport.send(email_message).await.map_err(|e| {
            error!("Failed to send email: {}", e);
            EmailError::SmtpError(format!("Failed to send email: {}", e))
        })?;

        info!("Email sent successfully");
        Ok(())
    }

    fn build_message(&self, message: EmailMessage) -> Result<Message, EmailError> {
        let from: Mailbox = format!("{} <{}>", self.config.from_name, self.config.from_email)
            .parse()
            .map_err(|e| EmailError::AddressError(format!("Invalid from address: {}", e)))?;
        let to: Mailbox = message
            .to
            .parse()
            .map_err(|e| EmailError::AddressError(format!("Invalid to address: {}", e)))?;

        let builder = Message::builder()
            .from(from)
            .to(to)
            .subject(message.subject);

        // Prefer HTML when both bodies are present
        let built = if let Some(html) = message.html_body {
            builder
                .header(ContentType::TEXT_HTML)
                .body(html)
        } else if let Some(text) = message.text_body {
            builder
                .header(ContentType::TEXT_PLAIN)
                .body(text)
        } else {
            return Err(EmailError::MessageError("Email has no body".to_string()));
        };

        built.map_err(|e| EmailError::MessageError(format!("Failed to build message: {}", e)))
    }

    fn verification_text(&self, user_name: &str, verify_url: &str) -> String {
        format!(
            r#"Hello {user_name},

Welcome to MediDiagnose. To activate your account, please confirm your
email address by opening the following link:

{verify_url}

If you did not create this account, you can ignore this email.

Best regards,
The MediDiagnose Team

---
This is an automated message. Please do not reply to this email."#,
        )
    }

    fn verification_html(&self, user_name: &str, verify_url: &str) -> String {
        format!(
            r#"<html>
<body>
  <p>Hello {user_name},</p>
  <p>Welcome to MediDiagnose. To activate your account, please confirm
  your email address:</p>
  <p><a href="{verify_url}">Verify my email</a></p>
  <p>If you did not create this account, you can ignore this email.</p>
  <p>Best regards,<br/>The MediDiagnose Team</p>
</body>
</html>"#,
        )
    }
}

#[async_trait]
impl EmailService for SmtpEmailService {
    #[instrument(skip(self, verify_url), fields(to = %to))]
    async fn send_verification_email(
        &self,
        to: &str,
        user_name: &str,
        verify_url: &str,
    ) -> Result<(), EmailError> {
        info!("Sending verification email to: {}", to);

        let message = EmailMessage::new(
            to.to_string(),
            "Verify your email - MediDiagnose".to_string(),
        )
        .with_text_body(self.verification_text(user_name, verify_url))
        .with_html_body(self.verification_html(user_name, verify_url));

        self.send_email(message).await?;

        info!("Verification email sent successfully");
        Ok(())
    }
}
