use chrono::Local;
use shared::domain::Record;

pub(crate) const CONFIG_ERROR_BANNER: &str = "<div class=\"error banner\">Error: Failed to load configuration or data. Please check the logs and ensure the backend is running.</div>";

pub(crate) fn escape(raw: &str) -> String {
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

fn pretty(record: &Record) -> String {
    serde_json::to_string_pretty(record).unwrap_or_else(|_| format!("{record:?}"))
}

pub(crate) fn sent_block(record: &Record) -> String {
    format!(
        "<p class=\"success\">Request successfully sent and stored!</p>\
         <p>You can view all received data on the <a href=\"./receive.html\">Receive Data page</a>.</p>\
         <h3>Sent Data:</h3>\
         <pre>{}</pre>",
        escape(&pretty(record))
    )
}

pub(crate) fn failure_block(prefix: &str, message: &str, backend_url: &str) -> String {
    format!(
        "<p class=\"error\">{}: {}</p>\
         <p>Please ensure the backend server is running and accessible at {}.</p>",
        escape(prefix),
        escape(message),
        escape(backend_url)
    )
}

pub(crate) fn empty_block() -> String {
    "<p>No data received yet. Send a request from the <a href=\"./index.html\">Send Request page</a>.</p>"
        .to_string()
}

pub(crate) fn record_block(record: &Record) -> String {
    let local = record.timestamp.with_timezone(&Local);
    format!(
        "<div class=\"record\">\
         <h4>Request ID: {}</h4>\
         <p>Timestamp: {}</p>\
         <pre>{}</pre>\
         </div>",
        record.id,
        local.format("%Y-%m-%d %H:%M:%S"),
        escape(&pretty(record))
    )
}
