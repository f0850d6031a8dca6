// file: src/llm/prompts.rs
// description: fixed Turkish instruction templates sent to the hosted model
// reference: prompt wording of the prospectus service

/// Phrase the model must return verbatim for questions the insert does not cover.
pub const OUT_OF_SCOPE_ANSWER: &str =
    "Bu sorunun cevabı mevcut prospektüs içinde bulunmamaktadır.";

/// Text substituted for a summary when inference fails and fallback is enabled.
pub const SUMMARY_FALLBACK: &str = "Özetleme işlemi başarısız oldu.";

/// Text substituted for an answer when inference fails and fallback is enabled.
pub const ANSWER_FALLBACK: &str = "Cevap oluşturulamadı.";

pub fn summary_prompt(text: &str) -> String {
    format!(
        "{} bu mesajı medikal içeriğine uygun ve yaşlıların da anlayacağı şekilde kısaca özetle. \
         Paragraf yap. Madde başlığı olmasın.",
        text
    )
}

pub fn answer_prompt(grounding_text: &str, question: &str) -> String {
    format!(
        "Aşağıda bir ilaç prospektüsünün tam metni verilmiştir.\n\
         Sadece bu metne dayalı soruları cevapla.\n\
         Eğer soru bu metinle ilgili değilse, şu şekilde yanıtla: \"{}\"\n\
         \n\
         Prospektüs Metni:\n\
         \"\"\"{}\"\"\"\n\
         \n\
         Soru: {}",
        OUT_OF_SCOPE_ANSWER, grounding_text, question
    )
}

pub fn relevance_prompt(excerpt: &str) -> String {
    format!(
        "Aşağıdaki metin bir ilaç prospektüsü (kullanma talimatı) mı? \
         Sadece EVET veya HAYIR olarak cevap ver.\n\n\"\"\"{}\"\"\"",
        excerpt
    )
}
