//! Server-rendered HTML pages.
//!
//! Pages are built with `format!` around a shared layout. The stylesheet is
//! embedded at compile time. Every user-supplied string goes through
//! [`encode_text`] before it is interpolated. User strings only ever land in
//! element content; anything placed in an attribute would need
//! `html_escape::encode_double_quoted_attribute` instead.

use html_escape::encode_text;
use solace_core::TranscriptEntry;
use solace_store::DashboardSnapshot;

/// Inline stylesheet shared by every page.
pub const STYLE_CSS: &str = include_str!("../assets/style.css");

fn layout(title: &str, authenticated: bool, body: &str) -> String {
    let account_links = if authenticated {
        r#"<a href="/chat">Chat</a><a href="/dashboard">Dashboard</a><a href="/logout">Logout</a>"#
    } else {
        r#"<a href="/login">Login</a>"#
    };
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | Solace</title>
<style>{css}</style>
</head>
<body>
<nav><span class="brand">Solace</span><a href="/">Home</a><a href="/about">About</a><a href="/services">Services</a>{account_links}</nav>
<main>
{body}
</main>
</body>
</html>"#,
        title = encode_text(title),
        css = STYLE_CSS,
        account_links = account_links,
        body = body,
    )
}

pub fn home(authenticated: bool) -> String {
    let call_to_action = if authenticated {
        r#"<a href="/chat"><button type="button">Start a conversation</button></a>"#
    } else {
        r#"<a href="/login"><button type="button">Sign in to start</button></a>"#
    };
    layout(
        "Home",
        authenticated,
        &format!(
            r#"<section class="card">
<h1>A calm place to talk things through</h1>
<p>Solace is a supportive chat companion. Share what is on your mind and get a
thoughtful reply. Messages that sound distressed are flagged so a person can
follow up.</p>
{}
</section>"#,
            call_to_action
        ),
    )
}

pub fn about(authenticated: bool) -> String {
    layout(
        "About",
        authenticated,
        r#"<section class="card">
<h1>About Solace</h1>
<p>Each message you send is answered by a language model and read by a
sentiment classifier. The operator dashboard shows how conversations are
going overall and lists the most recent messages that were judged negative.</p>
<p>Conversations are kept in memory only and are cleared when the service
restarts.</p>
</section>"#,
    )
}

pub fn services(authenticated: bool) -> String {
    layout(
        "Services",
        authenticated,
        r#"<section class="card">
<h1>Services</h1>
<ul>
<li><strong>Supportive chat</strong>: a reply to every message, any time.</li>
<li><strong>Sentiment insight</strong>: each message is labelled positive, negative or neutral.</li>
<li><strong>Concern escalation</strong>: negative messages are surfaced to the operator.</li>
</ul>
</section>"#,
    )
}

pub fn login(failed: bool) -> String {
    let alert = if failed {
        r#"<div class="alert danger">Invalid credentials. Please try again.</div>"#
    } else {
        ""
    };
    layout(
        "Login",
        false,
        &format!(
            r#"<section class="card">
<h1>Login</h1>
{alert}
<form method="post" action="/login">
<label for="username">Username</label>
<input type="text" id="username" name="username" autocomplete="username" required>
<label for="password">Password</label>
<input type="password" id="password" name="password" autocomplete="current-password" required>
<button type="submit">Login</button>
</form>
</section>"#,
            alert = alert
        ),
    )
}

/// What the chat page shows under the form.
#[derive(Debug, Clone, Copy)]
pub enum ChatOutcome<'a> {
    /// Fresh page, nothing submitted.
    Empty,
    /// The last exchange.
    Answered(&'a TranscriptEntry),
    /// The submission failed; the message is safe to show.
    Failed(&'a str),
}

pub fn chat(user: &str, outcome: ChatOutcome<'_>) -> String {
    let result = match outcome {
        ChatOutcome::Empty => String::new(),
        ChatOutcome::Answered(entry) => format!(
            r#"<section class="card">
<p><strong>You:</strong> {prompt}</p>
<p class="reply"><strong>Solace:</strong> {reply}</p>
<p class="sentiment">{sentiment}</p>
</section>"#,
            prompt = encode_text(&entry.prompt),
            reply = encode_text(&entry.reply),
            sentiment = encode_text(&entry.judgment().display()),
        ),
        ChatOutcome::Failed(message) => format!(
            r#"<div class="alert danger">{}</div>"#,
            encode_text(message)
        ),
    };
    layout(
        "Chat",
        true,
        &format!(
            r#"<section class="card">
<h1>Hi {user}, how are you feeling?</h1>
<form method="post" action="/chat">
<label for="user_input">Your message</label>
<textarea id="user_input" name="user_input" rows="3" required></textarea>
<button type="submit">Send</button>
</form>
</section>
{result}"#,
            user = encode_text(user),
            result = result
        ),
    )
}

pub fn dashboard(user: &str, snapshot: &DashboardSnapshot) -> String {
    let counts = &snapshot.sentiment_counts;

    let history_rows: String = snapshot
        .chat_history
        .iter()
        .map(|entry| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                encode_text(&entry.user_id),
                encode_text(&entry.prompt),
                encode_text(&entry.reply),
                encode_text(&entry.judgment().display()),
            )
        })
        .collect();
    let history = if history_rows.is_empty() {
        r#"<p class="empty">No conversations yet.</p>"#.to_string()
    } else {
        format!(
            "<table><tr><th>User</th><th>Message</th><th>Reply</th><th>Sentiment</th></tr>{}</table>",
            history_rows
        )
    };

    let concern_rows: String = snapshot
        .concerns
        .iter()
        .map(|concern| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                encode_text(&concern.user_id),
                encode_text(&concern.text),
                concern.recorded_at.format("%Y-%m-%d %H:%M:%S UTC"),
            )
        })
        .collect();
    let concerns = if concern_rows.is_empty() {
        r#"<p class="empty">No concerns raised.</p>"#.to_string()
    } else {
        format!(
            "<table><tr><th>User</th><th>Message</th><th>Raised</th></tr>{}</table>",
            concern_rows
        )
    };

    layout(
        "Dashboard",
        true,
        &format!(
            r#"<section class="card">
<h1>Dashboard</h1>
<p>Signed in as {user}. {total} messages recorded.</p>
<div class="counts">
<div class="positive"><strong>{positive}</strong>Positive</div>
<div class="negative"><strong>{negative}</strong>Negative</div>
<div class="neutral"><strong>{neutral}</strong>Neutral</div>
</div>
</section>
<section class="card">
<h2>Recent conversations</h2>
{history}
</section>
<section class="card">
<h2>Recent concerns</h2>
{concerns}
</section>
<script>
const events = new EventSource("/api/stream");
["interaction", "concern"].forEach((name) =>
  events.addEventListener(name, () => window.location.reload()));
</script>"#,
            user = encode_text(user),
            total = snapshot.stats.transcript_len,
            positive = counts.positive,
            negative = counts.negative,
            neutral = counts.neutral,
            history = history,
            concerns = concerns,
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use solace_core::{ConcernEntry, SentimentLabel, SentimentTally};
    use solace_store::StoreStats;
    use uuid::Uuid;

    fn entry(prompt: &str, label: &str) -> TranscriptEntry {
        TranscriptEntry {
            id: Uuid::new_v4(),
            seq: 0,
            user_id: "admin".to_string(),
            prompt: prompt.to_string(),
            reply: format!("about {}", prompt),
            sentiment_label: SentimentLabel::parse(label),
            confidence: 0.91,
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn test_user_name_is_encoded_as_text() {
        let html = chat(r#"<img src=x onerror="go()"> & co"#, ChatOutcome::Empty);
        assert!(html.contains(r#"Hi &lt;img src=x onerror="go()"&gt; &amp; co, how"#));
        assert!(!html.contains("<img"));
    }

    #[test]
    fn test_failure_notice_is_encoded() {
        let html = chat("admin", ChatOutcome::Failed("<b>down</b> & out"));
        assert!(html.contains("&lt;b&gt;down&lt;/b&gt; &amp; out"));
    }

    #[test]
    fn test_login_page_error_message() {
        assert!(login(true).contains("Invalid credentials. Please try again."));
        assert!(!login(false).contains("Invalid credentials"));
    }

    #[test]
    fn test_nav_reflects_session() {
        assert!(home(true).contains(r#"href="/logout""#));
        assert!(!home(false).contains(r#"href="/logout""#));
        assert!(about(false).contains(r#"href="/login""#));
        assert!(services(false).contains("Concern escalation"));
    }

    #[test]
    fn test_chat_page_shows_exchange_escaped() {
        let entry = entry("<b>sad</b>", "NEGATIVE");
        let html = chat("admin", ChatOutcome::Answered(&entry));
        assert!(html.contains("&lt;b&gt;sad&lt;/b&gt;"));
        assert!(!html.contains("<b>sad</b>"));
        assert!(html.contains("Sentiment: NEGATIVE (Confidence: 0.91)"));
    }

    #[test]
    fn test_chat_page_failure_notice() {
        let html = chat("admin", ChatOutcome::Failed("Try again."));
        assert!(html.contains(r#"<div class="alert danger">Try again.</div>"#));
    }

    #[test]
    fn test_dashboard_counts_and_tables() {
        let snapshot = DashboardSnapshot {
            sentiment_counts: SentimentTally {
                positive: 4,
                negative: 2,
                neutral: 1,
            },
            chat_history: vec![entry("hello", "POSITIVE")],
            concerns: vec![ConcernEntry {
                id: Uuid::new_v4(),
                transcript_seq: 3,
                user_id: "admin".to_string(),
                text: "I feel <awful>".to_string(),
                recorded_at: Utc::now(),
            }],
            stats: StoreStats {
                transcript_len: 7,
                concerns_len: 2,
                evicted_transcript: 0,
                evicted_concerns: 0,
            },
        };
        let html = dashboard("admin", &snapshot);
        assert!(html.contains("<strong>4</strong>Positive"));
        assert!(html.contains("<strong>2</strong>Negative"));
        assert!(html.contains("7 messages recorded"));
        assert!(html.contains("I feel &lt;awful&gt;"));
    }

    #[test]
    fn test_dashboard_empty_state() {
        let snapshot = DashboardSnapshot {
            sentiment_counts: SentimentTally::default(),
            chat_history: Vec::new(),
            concerns: Vec::new(),
            stats: StoreStats::default(),
        };
        let html = dashboard("admin", &snapshot);
        assert!(html.contains("No conversations yet."));
        assert!(html.contains("No concerns raised."));
    }
}
