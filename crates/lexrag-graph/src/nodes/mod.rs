pub mod classify;
pub mod generate;
pub mod grade_documents;
pub mod max_retries;
pub mod retrieve;
pub mod transform_query;
pub mod update_memory;

pub use classify::ClassifyQuestionNode;
pub use generate::GenerateNode;
pub use grade_documents::GradeDocumentsNode;
pub use max_retries::MaxRetriesNode;
pub use retrieve::RetrieveNode;
pub use transform_query::TransformQueryNode;
pub use update_memory::UpdateMemoryNode;

use lexrag_retrieval::Passage;

pub(crate) fn passage_texts(passages: Vec<Passage>) -> Vec<String> {
    passages.into_iter().map(|p| p.text).collect()
}
