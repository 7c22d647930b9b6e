//! Outgoing email.
//!
//! [`MailTransport`] delivers a finished [`EmailMessage`]; [`EmailService`]
//! renders the Latvian templates and never fails its callers: delivery
//! problems are logged and reported as `false`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use lettre::message::{header, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use parking_lot::Mutex;
use thiserror::Error;

use crate::config::{AppConfig, SmtpConfig};

#[derive(Debug, Error)]
pub enum MailError {
    #[error("SMTP credentials not configured")]
    NotConfigured,

    #[error("Invalid address {address}: {message}")]
    InvalidAddress { address: String, message: String },

    #[error("Failed to build email: {0}")]
    Build(String),

    #[error("Failed to send email: {0}")]
    Send(String),
}

/// A rendered email with plain-text and HTML bodies.
#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Whether messages can actually leave the process.
    fn is_configured(&self) -> bool;

    async fn send(&self, message: &EmailMessage) -> Result<(), MailError>;
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailError> {
    address.parse().map_err(|e: lettre::address::AddressError| MailError::InvalidAddress {
        address: address.to_string(),
        message: e.to_string(),
    })
}

/// SMTP delivery through lettre. Without credentials every send is skipped.
pub struct SmtpMailer {
    from: Mailbox,
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, MailError> {
        let from = parse_mailbox(&format!("{} <{}>", config.from_name, config.from_email))?;

        if !config.has_credentials() {
            return Ok(Self {
                from,
                transport: None,
            });
        }

        let credentials = Credentials::new(config.user.clone(), config.password.clone());
        let builder = if config.tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                .map_err(|e| MailError::Build(format!("SMTP relay error: {}", e)))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        };
        let transport = builder.port(config.port).credentials(credentials).build();

        Ok(Self {
            from,
            transport: Some(transport),
        })
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    fn is_configured(&self) -> bool {
        self.transport.is_some()
    }

    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        let transport = self.transport.as_ref().ok_or(MailError::NotConfigured)?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(parse_mailbox(&message.to)?)
            .subject(message.subject.clone())
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(message.text.clone()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(message.html.clone()),
                    ),
            )
            .map_err(|e| MailError::Build(e.to_string()))?;

        transport
            .send(email)
            .await
            .map_err(|e| MailError::Send(e.to_string()))?;
        Ok(())
    }
}

/// Keeps sent messages in memory. Used by tests and local runs.
#[derive(Default)]
pub struct MemoryTransport {
    sent: Mutex<Vec<EmailMessage>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl MailTransport for MemoryTransport {
    fn is_configured(&self) -> bool {
        true
    }

    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        self.sent.lock().push(message.clone());
        Ok(())
    }
}

/// Template rendering plus delivery.
#[derive(Clone)]
pub struct EmailService {
    transport: Arc<dyn MailTransport>,
    app_name: String,
    frontend_url: String,
}

impl std::fmt::Debug for EmailService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailService")
            .field("app_name", &self.app_name)
            .field("configured", &self.transport.is_configured())
            .finish()
    }
}

fn page(app_name: &str, accent: &str, heading: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="lv">
<head>
    <meta charset="utf-8">
    <style>
        body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #3B3E41; }}
        .container {{ max-width: 600px; margin: 0 auto; padding: 20px; }}
        .header {{ background-color: {accent}; color: white; padding: 20px; text-align: center; border-radius: 5px 5px 0 0; }}
        .header h1 {{ margin: 0; font-size: 24px; }}
        .content {{ padding: 25px; background-color: #DFDFDF; }}
        .box {{ background-color: #FFFFFF; padding: 15px; border-radius: 5px; margin: 15px 0; border-left: 4px solid {accent}; }}
        .button {{ display: inline-block; background-color: {accent}; color: white; padding: 12px 24px;
                   text-decoration: none; border-radius: 5px; margin-top: 15px; font-weight: bold; }}
        .footer {{ text-align: center; padding: 20px; color: #436597; font-size: 12px; background-color: #DFDFDF; }}
    </style>
</head>
<body>
    <div class="container">
        <div class="header"><h1>{heading}</h1></div>
        <div class="content">
{body}
        </div>
        <div class="footer"><p>Ar cieņu,<br>{app_name} komanda</p></div>
    </div>
</body>
</html>"#
    )
}

impl EmailService {
    pub fn new(
        transport: Arc<dyn MailTransport>,
        app_name: impl Into<String>,
        frontend_url: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            app_name: app_name.into(),
            frontend_url: frontend_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// SMTP-backed service for the given configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self, MailError> {
        let transport = SmtpMailer::new(&config.smtp)?;
        Ok(Self::new(
            Arc::new(transport),
            config.app_name.clone(),
            config.frontend_url.clone(),
        ))
    }

    pub fn is_enabled(&self) -> bool {
        self.transport.is_configured()
    }

    /// Deliver a message; `false` when skipped or failed.
    pub async fn send(&self, message: EmailMessage) -> bool {
        if !self.transport.is_configured() {
            log::warn!("SMTP credentials not configured, skipping email send");
            return false;
        }
        match self.transport.send(&message).await {
            Ok(()) => {
                log::info!("Email sent successfully to {}", message.to);
                true
            }
            Err(e) => {
                log::error!("Failed to send email to {}: {}", message.to, e);
                false
            }
        }
    }

    pub fn missing_entries_message(
        &self,
        to: &str,
        employee_name: &str,
        missing_dates: &[NaiveDate],
    ) -> EmailMessage {
        let app = &self.app_name;
        let text_dates: Vec<String> = missing_dates
            .iter()
            .map(|d| format!("• {}", d.format("%d.%m.%Y")))
            .collect();
        let html_dates: String = missing_dates
            .iter()
            .map(|d| format!("<li>{}</li>", d.format("%d.%m.%Y")))
            .collect();

        let text = format!(
            "Labdien, {employee_name}!\n\n\
             Mēs pamanījām, ka pēdējās darba dienās jūs neesat ievadījis informāciju par darba laiku:\n\n\
             {}\n\n\
             Lūdzu, ieejiet sistēmā un aizpildiet datus:\n{}\n\n\
             Ar cieņu,\n{app} komanda\n",
            text_dates.join("\n"),
            self.frontend_url,
        );
        let body = format!(
            "            <p>Labdien, <strong>{employee_name}</strong>!</p>\n\
             <p>Mēs pamanījām, ka pēdējās darba dienās jūs neesat ievadījis informāciju par darba laiku:</p>\n\
             <div class=\"box\"><ul>{html_dates}</ul></div>\n\
             <p>Lūdzu, ieejiet sistēmā un aizpildiet datus:</p>\n\
             <a href=\"{url}\" class=\"button\">Atvērt {app}</a>",
            url = self.frontend_url,
        );

        EmailMessage {
            to: to.to_string(),
            subject: format!("{app}: Lūdzu, ievadiet darba stundas"),
            text,
            html: page(app, "#279CF1", app, &body),
        }
    }

    pub fn weekly_planning_message(
        &self,
        to: &str,
        employee_name: &str,
        week_start: NaiveDate,
        week_end: NaiveDate,
    ) -> EmailMessage {
        let app = &self.app_name;
        let start = week_start.format("%d.%m.%Y");
        let end = week_end.format("%d.%m.%Y");
        let url = format!("{}/office", self.frontend_url);

        let text = format!(
            "Labdien, {employee_name}!\n\n\
             Jauna darba nedēļa sākas ({start} - {end}).\n\n\
             Lūdzu, ieejiet sistēmā un norādiet, kurās dienās plānojat strādāt no biroja un kurās - attālināti:\n{url}\n\n\
             Tas palīdzēs kolēģiem plānot tikšanās un sadarbību!\n\n\
             Ar cieņu,\n{app} komanda\n"
        );
        let body = format!(
            "            <p>Labdien, <strong>{employee_name}</strong>!</p>\n\
             <p>Jauna darba nedēļa sākas!</p>\n\
             <div class=\"box\"><strong>{start} - {end}</strong></div>\n\
             <p>Lūdzu, ieejiet sistēmā un norādiet, kurās dienās plānojat strādāt no biroja un kurās - attālināti.</p>\n\
             <p>Tas palīdzēs kolēģiem plānot tikšanās un sadarbību!</p>\n\
             <a href=\"{url}\" class=\"button\">Plānot darba vietu</a>"
        );

        EmailMessage {
            to: to.to_string(),
            subject: format!("{app}: Lūdzu, plānojiet darba vietu šai nedēļai"),
            text,
            html: page(app, "#279CF1", &format!("📅 {app}"), &body),
        }
    }

    pub fn change_request_message(
        &self,
        to: &str,
        admin_name: &str,
        employee_name: &str,
        request_type: &str,
        request_date: NaiveDate,
        reason: &str,
    ) -> EmailMessage {
        let app = &self.app_name;
        let url = format!("{}/admin/change-requests", self.frontend_url);

        let text = format!(
            "Labdien, {admin_name}!\n\n\
             {employee_name} ir iesniedzis jaunu izmaiņu pieprasījumu:\n\n\
             Pieprasījuma veids: {request_type}\n\
             Datums: {request_date}\n\
             Iemesls: {reason}\n\n\
             Lūdzu, pārskatiet pieprasījumu sistēmā:\n{url}\n\n\
             Ar cieņu,\n{app} komanda\n"
        );
        let body = format!(
            "            <p>Labdien, <strong>{admin_name}</strong>!</p>\n\
             <p>{employee_name} ir iesniedzis jaunu izmaiņu pieprasījumu:</p>\n\
             <div class=\"box\"><strong>Pieprasījuma veids:</strong> {request_type}</div>\n\
             <div class=\"box\"><strong>Datums:</strong> {request_date}</div>\n\
             <div class=\"box\"><strong>Iemesls:</strong> {reason}</div>\n\
             <a href=\"{url}\" class=\"button\">Pārskatīt pieprasījumu</a>"
        );

        EmailMessage {
            to: to.to_string(),
            subject: format!("{app}: Jauns izmaiņu pieprasījums no {employee_name}"),
            text,
            html: page(app, "#fa8c16", "📝 Jauns izmaiņu pieprasījums", &body),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> (Arc<MemoryTransport>, EmailService) {
        let transport = Arc::new(MemoryTransport::new());
        let service = EmailService::new(transport.clone(), "TimeControl", "https://tc.example.lv/");
        (transport, service)
    }

    #[test]
    fn test_missing_entries_template() {
        let (_, mail) = service();
        let dates = [
            NaiveDate::from_ymd_opt(2025, 3, 6).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 7).unwrap(),
        ];
        let msg = mail.missing_entries_message("anna@example.lv", "Anna Ozola", &dates);
        assert_eq!(msg.subject, "TimeControl: Lūdzu, ievadiet darba stundas");
        assert!(msg.text.contains("• 06.03.2025\n• 07.03.2025"));
        assert!(msg.html.contains("<li>07.03.2025</li>"));
        assert!(msg.text.contains("https://tc.example.lv\n"));
    }

    #[test]
    fn test_change_request_subject_names_employee() {
        let (_, mail) = service();
        let msg = mail.change_request_message(
            "boss@example.lv",
            "Boss",
            "Anna Ozola",
            "add_vacation",
            NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            "Family trip",
        );
        assert_eq!(msg.subject, "TimeControl: Jauns izmaiņu pieprasījums no Anna Ozola");
        assert!(msg.html.contains("https://tc.example.lv/admin/change-requests"));
    }

    #[tokio::test]
    async fn test_memory_transport_records() {
        let (transport, mail) = service();
        let msg = mail.weekly_planning_message(
            "anna@example.lv",
            "Anna",
            NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
        );
        assert!(mail.send(msg).await);
        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].text.contains("(10.03.2025 - 14.03.2025)"));
    }

    #[tokio::test]
    async fn test_smtp_without_credentials_skips() {
        let transport = SmtpMailer::new(&SmtpConfig::default()).unwrap();
        assert!(!transport.is_configured());
        let mail = EmailService::new(Arc::new(transport), "TimeControl", "http://localhost:3000");
        let msg = mail.missing_entries_message("a@b.lv", "A", &[]);
        assert!(!mail.send(msg).await);
    }
}
