// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持日文（默认）和英文
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 设置语言
///
/// # 参数
/// - locale: 语言代码（"ja" 或 "en"）
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(locale);
}

/// 翻译消息（无参数）
///
/// # 示例
/// ```no_run
/// use progress_board::i18n::t;
/// let label = t("risk.late");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息（带参数）
///
/// # 示例
/// ```no_run
/// use progress_board::i18n::t_with_args;
/// let msg = t_with_args("import.file_not_found", &[("path", "/tmp/board.csv")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    let mut result = rust_i18n::t!(key).to_string();
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}

/// 字段的本地化标签（CLI 列名）
pub fn field_label(field: &str) -> String {
    t(&format!("field.{}", field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::RiskLevel;
    use std::sync::Mutex;

    // rust-i18n 的 locale 为全局状态，且 Rust 测试默认并行执行；
    // 为避免测试互相干扰，这里对 i18n 相关测试串行化。
    static LOCALE_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_set_locale() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("en");
        assert_eq!(current_locale(), "en");

        set_locale("ja");
        assert_eq!(current_locale(), "ja");
    }

    #[test]
    fn test_risk_labels() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("ja");
        assert_eq!(RiskLevel::Late.label(), "遅延");
        assert_eq!(RiskLevel::Warn.label(), "要注意");
        assert_eq!(RiskLevel::Ok.label(), "順調");

        set_locale("en");
        assert_eq!(RiskLevel::Late.label(), "Late");
        assert_eq!(RiskLevel::Ok.label(), "On track");

        set_locale("ja");
    }

    #[test]
    fn test_translate_with_args() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("en");
        let msg = t_with_args("import.file_not_found", &[("path", "/tmp/board.csv")]);
        assert_eq!(msg, "File not found: /tmp/board.csv");
        assert_eq!(field_label("customer_due"), "Customer due");

        set_locale("ja");
        assert_eq!(field_label("internal_deadline"), "社内締切");
    }
}
