// All LLM prompt constants for the pipeline.
// Templates use `{placeholder}` tokens filled via `str::replace` before
// sending; both instruct the model to reply with strict JSON only.

/// Resume extraction prompt. Replace `{resume_text}` before sending.
/// The JSON schema here is the contract `CandidateRecord` parses against.
pub const EXTRACTION_PROMPT_TEMPLATE: &str = r#"
You are an expert ATS (Applicant Tracking System) parser specialized in HR data extraction. Extract structured information with high precision, following strict HR industry standards. Return only valid JSON data.

Extract and structure the following information with specific formatting requirements:

- Full Name
- Professional Title
- Contact Information
    - Email
    - Phone
    - LinkedIn
    - Location
- Professional Summary
    - Executive Summary (Brief professional snapshot, max 100 words)
    - Years of Experience (Total years as number)
    - Industry Focus (List of primary industries)
- Work Experience (for each position)
    - Title
    - Company
    - Location
    - Period
        - Start Date (YYYY-MM)
        - End Date (YYYY-MM or Present)
    - Achievements (List key quantifiable achievements)
    - Technologies Used (Relevant tools/technologies)
    - Company Industry (Primary industry of the employer)
    - Management Scope
        - Team Size (number or null if not applicable)
        - Budget Responsibility (value or null if not applicable)
- Education (for each entry)
    - Degree
    - Field of Study
    - Institution
    - Location
    - Graduation Date (YYYY)
    - GPA (if mentioned)
- Skills
    - Technical Skills (List technical skills)
    - Soft Skills (List soft skills)
    - Languages (for each language)
        - Language
        - Proficiency (Basic/Intermediate/Fluent/Native)
- Certifications (for each certification)
    - Name
    - Issuer
    - Date (YYYY-MM)
    - Expiry (YYYY-MM or No Expiry)
- HR Evaluation
    - Key Strengths (Top 3 standout qualities)
    - Potential Roles (Suggested roles based on profile)
    - Seniority Level (Junior/Mid/Senior/Executive)
    - Cultural Indicators (Observable traits relevant to workplace culture)
    - Development Areas (Potential growth areas based on profile gaps)

Instructions:
1. Maintain consistent date formatting (YYYY-MM)
2. Ensure all lists have at least one element
3. Use null for missing numerical values
4. Quantify achievements where possible (%, numbers, scale)
5. Standardize job titles to industry norms
6. Extract implied skills from experience descriptions

Resume Text:
{resume_text}
"#;

/// Outreach email prompt. Replace `{match_score}`, `{candidate_info}`
/// and `{role_info}` before sending.
pub const EMAIL_PROMPT_TEMPLATE: &str = r#"
You are an expert recruiter writing highly personalized emails to candidates.
Use the provided candidate information and role requirements to craft a compelling email.
The candidate has a match rate of {match_score}% for this role.

Key Requirements:
1. Use a warm, conversational tone that reflects the company culture.
2. Structure the email in three parts:
   - Greeting: "Hey [Name] 👋"
   - Body: Two short paragraphs (2-3 sentences each)
   - Closing: "Best regards,\n[Recruiter Name]"
3. Add phrases like "I noticed" or "I think" to make it personal.
4. Keep the email concise (around 20-30 words in body).
5. Use "\n" for line breaks between paragraphs.
6. Write in a friendly, approachable style.
7. Focus on their key skills and potential fit.

Candidate Information:
{candidate_info}

Role Information:
{role_info}

IMPORTANT: Return your response in the exact JSON format shown below. Do not include any additional text or formatting:
{
    "subject_line": "Exciting [Position] opportunity at [Company Name]😊",
    "email_body": "Hey [Name] 👋\n\nI noticed your strong [Key Skill] work at [Company]. Your [Specific Achievement] background caught my eye.\n\nLet's discuss our [Position] opportunity.\n\nBest regards,\n[Recruiter Name]",
    "personalization_points": [
        "Point about candidate's specific experience",
        "Point about candidate's relevant achievements",
        "Point about matching skills and qualifications"
    ],
    "highlight_skills": [
        "Relevant Skill 1",
        "Relevant Skill 2",
        "Relevant Skill 3"
    ]
}

Note: Replace placeholders with actual content. Ensure all keys and structure remain exactly as shown above.
"#;
