//! Task types and their fixed model instructions.

use std::fmt;
use std::str::FromStr;

use crate::error::PromptError;

const COMMIT_MESSAGE_INSTRUCTION: &str = "please generate a git commit message with a simple explanation from the changes stated above which is an output of a git diff command. all response of this message should be wrapped in a markdown format because it will be shared in a text-only terminal interface.";

const CODE_REVIEW_INSTRUCTION: &str = "please perform a efficient and concise code review which points out crucial improvements could be changed on the target code. the target code is stated above which is an output of a git diff command. all response of this message should be wrapped in a markdown format because it will be shared in a text-only terminal interface.";

const TEST_CASE_INSTRUCTION: &str = "Please generate detailed test cases from the changes stated above, which is an output of a git diff command. The test cases should be comprehensive and cover all the modifications, additions, and deletions in the code. All responses to this message should be wrapped in a markdown format because it will be shared in a text-only terminal interface. Ensure that the test cases include the following details\n- Description,\n- Steps, Detailed steps to execute the test case. \n- Expected Result, The expected outcome of the test case.\n- Actual Result, (This will be filled out during testing.)";

/// The kind of artifact to generate from a diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskType {
    CommitMessage,
    CodeReview,
    TestCase,
}

impl TaskType {
    pub const ALL: [TaskType; 3] = [
        TaskType::CommitMessage,
        TaskType::CodeReview,
        TaskType::TestCase,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::CommitMessage => "commit-message",
            TaskType::CodeReview => "code-review",
            TaskType::TestCase => "test-case",
        }
    }

    /// The system instruction sent alongside the diff for this task.
    pub fn instruction(self) -> &'static str {
        match self {
            TaskType::CommitMessage => COMMIT_MESSAGE_INSTRUCTION,
            TaskType::CodeReview => CODE_REVIEW_INSTRUCTION,
            TaskType::TestCase => TEST_CASE_INSTRUCTION,
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = PromptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "commit-message" | "commit" => Ok(TaskType::CommitMessage),
            "code-review" | "review" => Ok(TaskType::CodeReview),
            "test-case" | "test" => Ok(TaskType::TestCase),
            _ => Err(PromptError::InvalidTaskType(s.to_string())),
        }
    }
}

/// Numeric task identifiers, in declaration order.
impl TryFrom<u8> for TaskType {
    type Error = PromptError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        TaskType::ALL
            .get(usize::from(value))
            .copied()
            .ok_or_else(|| PromptError::InvalidTaskType(value.to_string()))
    }
}

/// Instruction plus diff, as handed to a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

/// Pair the task instruction with the diff text.
pub fn build_prompt(task: TaskType, diff: &str) -> PromptPair {
    PromptPair {
        system: task.instruction().to_string(),
        user: diff.to_string(),
    }
}
