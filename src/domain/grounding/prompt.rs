//! Grounding prompts

use super::ResponseType;

const SYSTEM_INSTRUCTION_EN: &str = "You are an expert agricultural advisor for Indian farmers. \
Your role is to provide accurate, practical, and actionable agricultural advice based on the \
provided context documents.

IMPORTANT GUIDELINES:
1. ONLY use information from the provided context documents
2. ALWAYS cite sources using [Source X] format when making claims
3. If the context doesn't contain enough information, clearly state this limitation
4. Provide specific, actionable advice with dosages, timing, and costs when available
5. Focus on practical solutions that farmers can implement
6. Include prevention strategies when discussing disease/pest management
7. Mention local availability and approximate costs when provided in context";

const SYSTEM_INSTRUCTION_HI: &str = "आप भारतीय किसानों के लिए एक विशेषज्ञ कृषि सलाहकार हैं। \
दिए गए संदर्भ दस्तावेज़ों के आधार पर सटीक, व्यावहारिक और उपयोगी कृषि सलाह दें।

महत्वपूर्ण दिशानिर्देश:
1. केवल दिए गए संदर्भ दस्तावेज़ों की जानकारी का उपयोग करें
2. हर दावे के लिए [Source X] प्रारूप में स्रोत का उल्लेख करें
3. यदि संदर्भ में पर्याप्त जानकारी नहीं है, तो यह स्पष्ट रूप से बताएं
4. उपलब्ध होने पर मात्रा, समय और लागत के साथ विशिष्ट सलाह दें
5. ऐसे व्यावहारिक समाधानों पर ध्यान दें जिन्हें किसान लागू कर सकें

उत्तर हिंदी में दें।";

const USER_PROMPT_EN: &str = "Based on the following agricultural knowledge context, please answer \
the farmer's question.

CONTEXT DOCUMENTS:
{context}

FARMER'S QUESTION: {query}

Please provide a helpful response based ONLY on the information in the context documents above. \
Always cite your sources using [Source X] format.";

const USER_PROMPT_HI: &str = "निम्नलिखित कृषि ज्ञान संदर्भ के आधार पर किसान के प्रश्न का उत्तर दें।

संदर्भ दस्तावेज़:
{context}

किसान का प्रश्न: {query}

केवल ऊपर दिए गए संदर्भ दस्तावेज़ों की जानकारी के आधार पर उत्तर दें। \
हमेशा [Source X] प्रारूप में स्रोतों का उल्लेख करें।";

/// Output token budget for a response style
pub fn max_tokens_for(response_type: &ResponseType) -> u32 {
    match response_type {
        ResponseType::Concise => 300,
        ResponseType::Comprehensive => 800,
        ResponseType::Technical => 600,
        _ => 500,
    }
}

fn style_line(response_type: &ResponseType) -> Option<&'static str> {
    match response_type {
        ResponseType::Comprehensive => {
            Some("Provide detailed, comprehensive responses with all relevant information.")
        }
        ResponseType::Concise => {
            Some("Provide concise, to-the-point responses focusing on key actionable items.")
        }
        ResponseType::Technical => Some(
            "Provide technical responses with scientific details and precise measurements.",
        ),
        _ => None,
    }
}

/// Language-specific system instruction; unknown languages use English
pub fn system_instruction(response_type: &ResponseType, language: &str) -> String {
    let base = match language {
        "hi" => SYSTEM_INSTRUCTION_HI,
        _ => SYSTEM_INSTRUCTION_EN,
    };

    match style_line(response_type) {
        Some(style) => format!("{}\n\nResponse Style: {}", base, style),
        None => base.to_string(),
    }
}

pub fn user_prompt(query: &str, context: &str, language: &str) -> String {
    let template = match language {
        "hi" => USER_PROMPT_HI,
        _ => USER_PROMPT_EN,
    };

    // context first so a query containing "{context}" is left alone
    let (head, tail) = template
        .split_once("{query}")
        .unwrap_or((template, ""));

    format!("{}{}{}", head.replace("{context}", context), query, tail)
}
