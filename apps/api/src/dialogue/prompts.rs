// All LLM prompt templates for the dialogue module.
// User text is substituted verbatim (quotes are not escaped) via `str::replace`.

/// Text routing classifier. Replace `{prompt}` and `{json_only}`.
pub const TEXT_INTENT_TEMPLATE: &str = r#"You are an AI assistant specializing in providing advice related to careers, job opportunities, and job searches. Analyze the following prompt to determine the user's intent: "{prompt}"

Return your analysis in JSON format with two fields:
- "intent": Must be one of "career_guidance", "job_search", or "other"
- "query": If intent is "job_search", extract the key search terms (e.g., job title, location, or industry). Otherwise, use null.

Examples:
"What skills should I learn to become a data scientist?" ->
{"intent": "career_guidance", "query": null}

"Can you help me find marketing jobs in Los Angeles?" ->
{"intent": "job_search", "query": "marketing, Los Angeles"}

"What's the weather like today?" ->
{"intent": "other", "query": null}

"How do I prepare for a software engineering interview?" ->
{"intent": "career_guidance", "query": null}

"Find me remote graphic design jobs." ->
{"intent": "job_search", "query": "remote, graphic design"}

"Tell me a joke." ->
{"intent": "other", "query": null}

{json_only}"#;

/// Media routing classifier for text sent with an image. Replace `{prompt}` and `{json_only}`.
pub const MEDIA_INTENT_TEMPLATE: &str = r#"You are an AI assistant analyzing user intent.
Determine if the following prompt is related to 'image_analysis', 'greeting', or 'other'.

User prompt: "{prompt}"

Return the result in JSON format:
{"intent": "image_analysis" or "greeting" or "other"}

{json_only}"#;

/// Image type classifier, sent alongside the image. Replace `{json_only}`.
pub const IMAGE_INTENT_TEMPLATE: &str = r#"You are an AI assistant that identifies the type of an uploaded image.
Determine whether the image is a 'resume' or 'other'.

Return your response in JSON format:
{"intent": "resume" or "other"}

{json_only}"#;

/// Career advice strategy. Replace `{prompt}` and `{json_only}`.
pub const ADVICE_TEMPLATE: &str = r#"You are an AI career mentor providing expert career guidance.
The user asks: "{prompt}"
Provide a well-structured and concise response in the following JSON format:
{"advice": "Your response here"}

{json_only}"#;

/// Job summarization strategy. Replace `{query}`, `{jobs}` and `{json_only}`.
pub const JOB_SUGGESTIONS_TEMPLATE: &str = r#"You are a job search assistant. The user is looking for jobs matching "{query}".
The job listings found: "{jobs}"
Provide a response in the given JSON format:
{"job_suggestions": "Your response here"}

{json_only}"#;

/// Resume feedback strategy, sent alongside the image. Replace `{prompt}`.
pub const RESUME_FEEDBACK_TEMPLATE: &str = "You are an AI resume expert. Analyze the following \
resume image and provide feedback on any improvements, refinements, or upgrades needed. \
If the resume is well-structured with no major issues, respond with 'It is all good'. \
Resume feedback should focus on formatting, clarity, relevant skills, and industry standards.\n\n\
Prompt: {prompt}";

pub const GREETING_REPLY: &str = "Hello! How can I assist you today?";
pub const UPLOAD_RESUME_REPLY: &str = "I can analyze resumes. Please upload a resume for review.";
pub const UNSUPPORTED_IMAGE_REPLY: &str =
    "Unsupported image type. Please upload a resume for analysis.";
