//! Subjects and HTML bodies for account e-mails.

/// A message ready to hand to a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMail {
    pub subject: String,
    pub html: String,
}

/// Renders account e-mails for one deployment.
#[derive(Debug, Clone)]
pub struct MailTemplates {
    product_name: String,
    frontend_url: String,
}

impl MailTemplates {
    pub fn new(product_name: impl Into<String>, frontend_url: impl Into<String>) -> Self {
        Self {
            product_name: product_name.into(),
            frontend_url: frontend_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Front-end page that accepts a reset token.
    pub fn reset_url(&self, token: &str) -> String {
        format!("{}/reset-password?token={}", self.frontend_url, token)
    }

    pub fn invitation(&self, temp_password: &str) -> RenderedMail {
        let product = escape_html(&self.product_name);
        RenderedMail {
            subject: format!("Your access to {}", self.product_name),
            html: format!(
                "<html><body>\
                 <p>An account has been created for you on {product}.</p>\
                 <p>Your temporary password is: <strong>{password}</strong></p>\
                 <p>You will be asked to choose a new password at your first sign-in: \
                 <a href=\"{login}\">{login}</a></p>\
                 </body></html>",
                product = product,
                password = escape_html(temp_password),
                login = escape_html(&format!("{}/login", self.frontend_url)),
            ),
        }
    }

    pub fn password_changed(&self, first_name: &str) -> RenderedMail {
        RenderedMail {
            subject: "Your password has been changed".to_string(),
            html: format!(
                "<html><body>\
                 <p>Hello {name},</p>\
                 <p>The password of your {product} account was just changed.</p>\
                 <p>If you did not do this, contact your administrator immediately.</p>\
                 </body></html>",
                name = escape_html(first_name),
                product = escape_html(&self.product_name),
            ),
        }
    }

    pub fn reset_link(&self, token: &str) -> RenderedMail {
        let link = escape_html(&self.reset_url(token));
        RenderedMail {
            subject: "Reset your password".to_string(),
            html: format!(
                "<html><body>\
                 <p>A password reset was requested for your {product} account.</p>\
                 <p><a href=\"{link}\">Choose a new password</a></p>\
                 <p>The link is valid for a limited time. Ignore this e-mail if you \
                 did not ask for it.</p>\
                 </body></html>",
                product = escape_html(&self.product_name),
                link = link,
            ),
        }
    }
}

/// Escapes text for HTML bodies. Every value interpolated into the
/// `format!` templates above passes through here.
fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
