//! Fixed user-facing messages written into `generation` on the early-exit paths.

/// Category 1: the question is not about law.
pub const NON_LEGAL_MESSAGE: &str = "Câu hỏi của bạn dường như không thuộc lĩnh vực pháp luật. Vui lòng đặt câu hỏi liên quan đến pháp luật để hệ thống có thể hỗ trợ chính xác hơn.";

/// Used when a provider call fails and no better answer exists.
pub const PROVIDER_ERROR_MESSAGE: &str = "Rất tiếc, có lỗi xảy ra. Vui lòng thử lại sau.";

/// Written by `max_retries` once a retry budget is exhausted.
pub const NO_INFORMATION_MESSAGE: &str = "Rất tiếc, hệ thống hiện không tìm thấy thông tin phù hợp với câu hỏi của bạn. Vui lòng thử lại sau.";

/// Header placed between the answer and its cited passages.
pub const SOURCES_HEADER: &str = "\n\nSOURCES OF INFORMATION:\n";

/// Category 7: a legal question outside the supported bodies of law.
pub fn unsupported_domain_message(reason: &str) -> String {
    format!(
        "Câu hỏi của bạn thuộc lĩnh vực pháp luật, tuy nhiên hiện tại hệ thống chưa hỗ trợ trả lời các câu hỏi thuộc lĩnh vực này. {} Bạn có thể hỏi về các vấn đề như lao động, dân sự, hình sự, hiến pháp... để hệ thống hỗ trợ tốt hơn.",
        reason.trim()
    )
}
