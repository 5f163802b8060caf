//! Transactional email via the Resend HTTP API.
//!
//! Two kinds of mail leave this service: bulk announcements to an explicit
//! recipient list, and single review-pending reminders to a reviewer.
//! Neither is sent from the verification workflow; they have their own
//! endpoints.

use crate::config::MailerConfig;
use crate::error::{Error, Result};
use crate::event::{ServiceEvent, ServiceEventsSender};
use serde::Serialize;
use tracing::{info, warn};

/// Outcome of a bulk send.
#[derive(Debug, Clone, Copy)]
pub struct BulkSendReport {
    /// Recipients the provider accepted.
    pub delivered: usize,
    /// Recipients the provider rejected or that errored.
    pub failed: usize,
}

/// Mail client over the Resend API.
pub struct Mailer {
    config: MailerConfig,
    http: reqwest::Client,
    events: ServiceEventsSender,
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

impl Mailer {
    /// Create a mailer from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: MailerConfig, events: ServiceEventsSender) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::Config(format!("failed to build mail client: {e}")))?;

        Ok(Self {
            config,
            http,
            events,
        })
    }

    /// Send an announcement to every address in `recipients`.
    ///
    /// Each recipient is a separate provider call; one rejection does not
    /// abort the rest. The report carries the per-recipient tallies.
    ///
    /// # Errors
    ///
    /// Returns an error only if no mail could be attempted at all.
    pub async fn send_bulk(
        &self,
        subject: &str,
        message: &str,
        recipients: &[String],
    ) -> Result<BulkSendReport> {
        info!("Sending bulk email to {} recipients", recipients.len());

        let html = render_announcement(subject, message);
        let mut delivered = 0;
        let mut failed = 0;

        for recipient in recipients {
            match self
                .send_one(&self.config.bulk_from, recipient, subject, &html)
                .await
            {
                Ok(()) => delivered += 1,
                Err(e) => {
                    warn!("Bulk email to {recipient} failed: {e}");
                    failed += 1;
                }
            }
        }

        info!("Sent {delivered} emails successfully, {failed} failed");
        let _ = self
            .events
            .send(ServiceEvent::EmailSent { delivered, failed });

        Ok(BulkSendReport { delivered, failed })
    }

    /// Send a review-pending reminder to a reviewer.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider rejects the send.
    pub async fn send_reviewer_reminder(
        &self,
        review_id: &str,
        reviewer_email: &str,
        manuscript_title: &str,
    ) -> Result<()> {
        info!("Sending reminder for review {review_id} to {reviewer_email}");

        let subject = format!("Reminder: Review Pending for \"{manuscript_title}\"");
        let html = render_reviewer_reminder(manuscript_title, &self.config.dashboard_url);
        self.send_one(&self.config.editorial_from, reviewer_email, &subject, &html)
            .await?;

        let _ = self.events.send(ServiceEvent::EmailSent {
            delivered: 1,
            failed: 0,
        });
        Ok(())
    }

    async fn send_one(&self, from: &str, to: &str, subject: &str, html: &str) -> Result<()> {
        let response = self
            .http
            .post(format!("{}/emails", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&SendRequest {
                from,
                to: [to],
                subject,
                html,
            })
            .send()
            .await
            .map_err(|e| Error::Mail(format!("mail provider unreachable: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::Mail(format!(
                "mail provider returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}

/// Render the announcement template.
#[must_use]
pub fn render_announcement(subject: &str, message: &str) -> String {
    let body = message.replace('\n', "<br>");
    format!(
        r#"<!DOCTYPE html>
<html>
  <body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
      <div style="background: #2563eb; color: white; padding: 20px; text-align: center;">
        <h2>{subject}</h2>
      </div>
      <div style="padding: 20px; background: #f9fafb;">
        {body}
      </div>
      <div style="padding: 20px; text-align: center; font-size: 12px; color: #6b7280;">
        <p>African Journal of Veterinary Sciences</p>
      </div>
    </div>
  </body>
</html>"#
    )
}

/// Render the reviewer reminder template.
#[must_use]
pub fn render_reviewer_reminder(manuscript_title: &str, dashboard_url: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
  <body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
      <div style="background: #f59e0b; color: white; padding: 20px; text-align: center;">
        <h2>Review Reminder</h2>
      </div>
      <div style="padding: 20px; background: #f9fafb;">
        <p>Dear Reviewer,</p>
        <p>This is a friendly reminder that your review for the following manuscript is pending:</p>
        <p><strong>{manuscript_title}</strong></p>
        <p>Please log in to your dashboard to complete the review at your earliest convenience.</p>
        <a href="{dashboard_url}/reviewer-dashboard" style="display: inline-block; padding: 12px 24px; background: #f59e0b; color: white; text-decoration: none; border-radius: 6px;">Complete Review</a>
        <p>If you need an extension or have any questions, please contact the editorial office.</p>
        <p>Best regards,<br><strong>Editorial Team</strong><br>African Journal of Veterinary Sciences</p>
      </div>
      <div style="padding: 20px; text-align: center; font-size: 12px; color: #6b7280;">
        <p>This is an automated reminder.</p>
      </div>
    </div>
  </body>
</html>"#
    )
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::event::create_event_channel;

    #[tokio::test]
    async fn test_bulk_send_tallies_unreachable_provider() {
        let (events, _rx) = create_event_channel();
        let mailer = Mailer::new(
            MailerConfig {
                base_url: "http://127.0.0.1:9".to_string(),
                ..Default::default()
            },
            events,
        )
        .expect("mailer builds");

        let recipients = vec!["a@example.org".to_string(), "b@example.org".to_string()];
        let report = mailer
            .send_bulk("Subject", "Body", &recipients)
            .await
            .expect("report");
        assert_eq!(report.delivered, 0);
        assert_eq!(report.failed, 2);
    }

    #[test]
    fn test_announcement_renders_subject_and_linebreaks() {
        let html = render_announcement("Call for Papers", "Line one\nLine two");
        assert!(html.contains("<h2>Call for Papers</h2>"));
        assert!(html.contains("Line one<br>Line two"));
        assert!(html.contains("African Journal of Veterinary Sciences"));
    }

    #[test]
    fn test_reminder_renders_title_and_dashboard_link() {
        let html = render_reviewer_reminder("Bovine Trypanosomiasis Survey", "https://ajvs.org");
        assert!(html.contains("<strong>Bovine Trypanosomiasis Survey</strong>"));
        assert!(html.contains("https://ajvs.org/reviewer-dashboard"));
    }
}
