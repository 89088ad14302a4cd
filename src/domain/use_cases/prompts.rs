use crate::entities::{
    chat::{ChatMessage, MemberCard},
    email::EmailRecipient,
    profile::{non_blank, UserProfile},
};

/// Messages of history included in a chat prompt.
pub const CHAT_PROMPT_HISTORY: usize = 8;

fn joined_or(values: &[String], fallback: &str) -> String {
    if values.is_empty() {
        fallback.to_string()
    } else {
        values.join(", ")
    }
}

pub fn resume_parse_prompt(resume_text: &str) -> String {
    format!(
        r#"You are an expert resume parser. Read the resume below and extract structured information.

Resume text:
{resume_text}

Answer with one JSON object using exactly these keys:
{{
    "full_name": "the person's full name",
    "email": "email address",
    "phone": "phone number",
    "linkedin_url": "LinkedIn profile URL (linkedin.com/in/...)",
    "major": "primary field of study",
    "graduation_year": expected or actual graduation year as an integer,
    "location": "current city",
    "skills": ["technical and professional skills"],
    "work_experience": [
        {{"company": "employer", "title": "job title", "duration": "e.g. Jan 2023 - Present", "description": "short summary"}}
    ],
    "education": [
        {{"school": "institution", "degree": "degree type", "major": "field of study", "graduation_year": year as an integer}}
    ],
    "projects": [
        {{"name": "project name", "description": "short summary", "technologies": ["tools used"]}}
    ],
    "clubs": ["student organizations"],
    "courses": ["relevant coursework"],
    "industries": ["industries of experience or interest"]
}}

Rules:
- Return only the JSON object with no surrounding text.
- Use null for anything the resume does not contain.
- Infer the graduation year from context when it is not stated.
- List every skill mentioned, including tools and languages.
- Look for the LinkedIn URL in the contact section."#
    )
}

/// Template used when the member has not saved their own.
pub fn default_email_template(organization_name: &str) -> String {
    format!(
        "Hi {{alumni_name}},\n\n\
         I'm {{user_name}}, a {{user_major}} student. I found your profile through {organization_name} \
         and was excited to see your work at {{company}}.\n\n\
         I'd love to hear about your career path and any advice you have for someone exploring this field. \
         Would you be open to a quick 15-minute call sometime?\n\n\
         Thanks so much,\n{{user_name}}"
    )
}

pub fn email_prompt(sender: &UserProfile, recipient: &EmailRecipient, organization_name: &str) -> String {
    let sender_name = if sender.full_name.trim().is_empty() {
        format!("A {} member", organization_name)
    } else {
        sender.full_name.trim().to_string()
    };
    let grad_year = sender
        .graduation_year
        .map(|y| y.to_string())
        .unwrap_or_else(|| "Current student".to_string());
    let company = recipient.company().unwrap_or("your company");

    match non_blank(&sender.email_template) {
        Some(template) => format!(
            r#"You are helping a member write a professional networking email from their own template.
Follow the template closely and personalise it with the details below.

MEMBER'S TEMPLATE:
{template}

SENDER:
- Name: {sender_name}
- Major: {major}
- Graduation Year: {grad_year}
- Career Interests: {interests}
- Bio: {bio}

RECIPIENT:
- Name: {recipient_name}
- Company: {company}
- Role: {role}
- Industry: {industry}

Replace placeholders such as NAME with real names. Keep it professional and warm, and make it sound genuine.
Output only the email text with no explanations or markdown."#,
            major = non_blank(&sender.major).unwrap_or("a student"),
            interests = joined_or(&sender.career_interests, "Not specified"),
            bio = non_blank(&sender.bio).unwrap_or("Not provided"),
            recipient_name = recipient.name(),
            role = recipient.role().unwrap_or("Not specified"),
            industry = recipient.industry().unwrap_or("Not specified"),
        ),
        None => format!(
            r#"Write a professional networking email from a student to an alumnus of {organization_name}.

SENDER:
- Name: {sender_name}
- Major: {major}
- Graduation Year: {grad_year}
- Career Interests: {interests}
- Target Industries: {industries}
- Bio: {bio}

RECIPIENT:
- Name: {recipient_name}
- Company: {company}
- Role: {role}
- Industry: {industry}

TEMPLATE TO PERSONALISE:
{template}

Instructions:
1. Open with "Hi {recipient_first},"
2. Stay under 100 words, four or five sentences.
3. Introduce the sender, show real interest in the recipient's work and make a clear ask.
4. Mention something specific about their company or role when possible.
5. Sign off with the sender's first name.

Output only the email text with no explanations or markdown."#,
            major = non_blank(&sender.major).unwrap_or("a student"),
            interests = joined_or(&sender.career_interests, "Exploring career options"),
            industries = joined_or(&sender.target_industries, "Various"),
            bio = non_blank(&sender.bio).unwrap_or("Eager to learn and connect"),
            recipient_name = recipient.name(),
            recipient_first = recipient.first_name(),
            role = recipient.role().unwrap_or("Professional"),
            industry = recipient.industry().unwrap_or("Not specified"),
            template = default_email_template(organization_name),
        ),
    }
}

pub fn email_subject(sender: &UserProfile, organization_name: &str) -> String {
    let first = match sender.first_name() {
        "" => "A Member",
        name => name,
    };
    format!("Connecting from {} - {}", organization_name, first)
}

fn chat_system_prompt(profile: Option<&UserProfile>, members: &[MemberCard], organization_name: &str) -> String {
    let name = profile
        .map(|p| p.full_name.trim())
        .filter(|n| !n.is_empty())
        .unwrap_or("Member");
    let major = profile.and_then(|p| non_blank(&p.major)).unwrap_or("Not specified");
    let companies = profile
        .map(|p| joined_or(&p.companies, "Not specified"))
        .unwrap_or_else(|| "Not specified".to_string());
    let interests = profile
        .map(|p| joined_or(&p.career_interests, "Not specified"))
        .unwrap_or_else(|| "Not specified".to_string());

    let results = if members.is_empty() {
        "MEMBER SEARCH RESULTS: No members found matching this query.".to_string()
    } else {
        let lines: Vec<String> = members
            .iter()
            .map(|m| format!("- {} ({} at {})", m.name, m.role_title, m.company))
            .collect();
        format!("MEMBER SEARCH RESULTS:\n{}", lines.join("\n"))
    };

    format!(
        r#"You are the {organization_name} Networking Advisor, an assistant for members of {organization_name}.

YOUR ROLE:
- Give networking advice and strategies.
- Offer career guidance and professional development tips.
- Explain how to use the alumni directory, recommendations and the email writer.
- Help members find relevant alumni.

MEMBER CONTEXT:
- Name: {name}
- Major: {major}
- Companies: {companies}
- Career Interests: {interests}

GUIDELINES:
- Be warm, professional and encouraging.
- Keep answers to three to five sentences unless more detail is needed.
- Give concrete, actionable steps.
- When listing members, say briefly why each is relevant.
- Redirect off-topic questions to networking and careers.
- Write plain conversational text without markdown.

MEMBER SEARCH RULES:
- Only mention people listed under MEMBER SEARCH RESULTS.
- Never invent member names.
- If the results are empty or do not fit the question, say you couldn't find anyone matching and suggest the Alumni Directory.

{results}"#
    )
}

/// Full prompt for one chat turn: system text, the tail of the history and
/// the new question, ending with an open assistant turn.
pub fn chat_prompt(
    profile: Option<&UserProfile>,
    members: &[MemberCard],
    history: &[ChatMessage],
    message: &str,
    organization_name: &str,
) -> String {
    let mut parts = vec![chat_system_prompt(profile, members, organization_name)];

    let skip = history.len().saturating_sub(CHAT_PROMPT_HISTORY);
    for entry in &history[skip..] {
        let speaker = if entry.is_user() { "User" } else { "Assistant" };
        parts.push(format!("{}: {}", speaker, entry.content));
    }
    parts.push(format!("User: {}", message));

    format!("{}\n\nAssistant:", parts.join("\n\n"))
}
