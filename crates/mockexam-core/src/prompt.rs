//! Exam generation prompt.

/// Everything the generator needs to know about the exam to write.
#[derive(Debug, Clone)]
pub struct ExamPrompt<'a> {
    /// Language the questions must be written in.
    pub language: &'a str,
    /// Exact number of questions requested.
    pub question_count: u32,
    pub grade: &'a str,
    pub topic_title: &'a str,
    /// Curriculum text, embedded verbatim.
    pub context: &'a str,
}

impl ExamPrompt<'_> {
    /// Render the prompt with its strict JSON output contract.
    pub fn render(&self) -> String {
        format!(
            r#"You are a science teacher writing a mock exam.
Create a mock exam with exactly {count} multiple-choice questions for:
- Grade: {grade}
- Topic: {topic}

Base every question on the following curriculum content:
{context}

Rules:
1. Language: {language}.
2. Format: a JSON array of objects.
3. Difficulty: a mix of easy, medium and hard.
4. Every object has exactly this shape:
   {{
     "id": "unique_id",
     "question": "Question text",
     "choices": ["Choice 1", "Choice 2", "Choice 3", "Choice 4", "Choice 5"],
     "answer": 0-4 (zero-based integer index of the correct choice),
     "difficulty": "easy" | "medium" | "hard",
     "explanation": "Brief explanation of the answer"
   }}
5. Total count: exactly {count} questions.
6. Return ONLY the JSON array. No surrounding prose and no markdown code fences."#,
            count = self.question_count,
            grade = self.grade,
            topic = self.topic_title,
            context = self.context,
            language = self.language,
        )
    }
}
