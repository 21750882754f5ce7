//! Templated email, sent in the background

use crate::infrastructure::config::AppConfig;
use anyhow::Context;
use async_trait::async_trait;
use di::{Ref, inject, injectable};
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use log::{error, info, warn};
use minijinja::{Environment, context};

const WELCOME_TEMPLATE: &str = include_str!("templates/welcome.html");
const BOT_PUBLISHED_TEMPLATE: &str = include_str!("templates/bot_published.html");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> anyhow::Result<()>;
}

/// Sends through SMTP when `SMTP_HOST` is configured and only logs the email otherwise.
pub struct SmtpEmailSender {
    from: String,
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
}

#[injectable(EmailSender)]
impl SmtpEmailSender {
    #[inject]
    pub fn create(config: Ref<AppConfig>) -> Self {
        let transport = config.smtp.as_ref().and_then(|smtp| {
            match AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host) {
                Ok(builder) => {
                    let mut builder = builder.port(smtp.port);
                    if let (Some(username), Some(password)) = (&smtp.username, &smtp.password) {
                        let credentials = Credentials::new(username.clone(), password.clone());
                        builder = builder.credentials(credentials);
                    }
                    Some(builder.build())
                }
                Err(e) => {
                    error!("invalid SMTP relay {}: {e}", smtp.host);
                    None
                }
            }
        });

        Self {
            from: config.email_from.clone(),
            transport,
        }
    }
}

#[async_trait]
impl EmailSender for SmtpEmailSender {
    async fn send(&self, email: OutgoingEmail) -> anyhow::Result<()> {
        let Some(transport) = &self.transport else {
            info!("SMTP not configured, email to {} not sent: {}", email.to, email.subject);
            return Ok(());
        };

        let message = Message::builder()
            .from(self.from.parse().context("invalid sender address")?)
            .to(email.to.parse().context("invalid recipient address")?)
            .subject(email.subject)
            .header(ContentType::TEXT_HTML)
            .body(email.html)?;

        transport.send(message).await?;
        Ok(())
    }
}

/// Sends the email on a detached task. Failures are logged and never reach the caller.
pub fn dispatch(sender: Ref<dyn EmailSender>, email: anyhow::Result<OutgoingEmail>) {
    let email = match email {
        Ok(email) => email,
        Err(e) => {
            warn!("failed to render email: {e:#}");
            return;
        }
    };

    tokio::spawn(async move {
        let recipient = email.to.clone();
        if let Err(e) = sender.send(email).await {
            warn!("failed to send email to {recipient}: {e:#}");
        }
    });
}

pub fn welcome_email(to: &str, name: &str) -> anyhow::Result<OutgoingEmail> {
    Ok(OutgoingEmail {
        to: to.to_owned(),
        subject: "Welcome to Chatbot Studio!".to_owned(),
        html: render(WELCOME_TEMPLATE, context! { name => name })?,
    })
}

pub fn bot_published_email(
    to: &str,
    name: &str,
    bot_name: &str,
    bot_url: &str,
) -> anyhow::Result<OutgoingEmail> {
    Ok(OutgoingEmail {
        to: to.to_owned(),
        subject: format!("Your bot \"{bot_name}\" is now live!"),
        html: render(
            BOT_PUBLISHED_TEMPLATE,
            context! { name => name, bot_name => bot_name, bot_url => bot_url },
        )?,
    })
}

fn render(template: &str, ctx: minijinja::Value) -> anyhow::Result<String> {
    let mut env = Environment::new();
    env.add_template("email.html", template)?;
    Ok(env.get_template("email.html")?.render(ctx)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn welcome_email_greets_by_name() {
        let email = welcome_email("ada@example.com", "Ada").unwrap();

        assert_eq!(email.to, "ada@example.com");
        assert_eq!(email.subject, "Welcome to Chatbot Studio!");
        assert!(email.html.contains("Welcome to Chatbot Studio, Ada!"));
    }

    #[test]
    fn published_email_links_to_the_bot() {
        let email = bot_published_email(
            "ada@example.com",
            "Ada",
            "Support <Bot>",
            "https://app.example/bots/42",
        )
        .unwrap();

        assert_eq!(email.subject, "Your bot \"Support <Bot>\" is now live!");
        assert!(email.html.contains("app.example"));
        // template output is HTML-escaped
        assert!(email.html.contains("Support &lt;Bot&gt;"));
    }

    #[tokio::test]
    async fn unconfigured_sender_only_logs() {
        let sender = SmtpEmailSender::create(Ref::new(AppConfig::default()));
        let email = welcome_email("ada@example.com", "Ada").unwrap();

        assert!(sender.send(email).await.is_ok());
    }
}
