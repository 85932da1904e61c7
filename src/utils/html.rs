use ammonia;

/// Clean admin-authored HTML before it is stored as subject help text.
///
/// Whitelist-based: safe formatting tags (<b>, <p>, <a>) survive while
/// <script>, <iframe> and event-handler attributes are stripped.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}
