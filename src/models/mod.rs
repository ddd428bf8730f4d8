pub mod document;
pub mod graph;
pub mod message;
pub mod response;
pub mod user;

pub use document::{
    CollectionRequest, Document, DocumentCollection, DocumentSearchPayload, DocumentSearchResultPage,
    GetDocumentsRequest, SearchType, UpdateDocumentRequest,
};
pub use graph::{
    AddDataRequest, CreateGraphRequest, EdgeType, EntityEdge, EntityEdgeSourceTarget, EntityNode,
    EntityProperty, EntityPropertyType, EntityType, Episode, EpisodeMentions, EpisodeResponse, Fact,
    FactsResponse,
    Graph, GraphDataType, GraphListResponse, GraphPageRequest, GraphSearchQuery, GraphSearchResults,
    GraphSearchScope, Ontology, Reranker, SearchFilters, UpdateGraphRequest,
};
pub use message::{
    AddThreadMessagesRequest, AddThreadMessagesResponse, ApiAck, ContextMode, CreateThreadRequest,
    Message, MessageListResponse, RoleType, Thread, ThreadContextResponse, ThreadListResponse,
    UpdateMessageRequest,
};
pub use response::{
    AddMessageData, ChatData, ClearLogsData, CollectionSummary, CollectionsData, DeletedData,
    DocumentsData, EdgesData, EpisodesData, ErrorResponse, GraphSearchData, LogsData, MessagesData,
    NodesData, SuccessResponse, ThreadContextData, ThreadsData, UsersData,
};
pub use user::{
    CreateUserRequest, FactRatingExamples, FactRatingInstruction, UpdateUserRequest, User,
    UserListResponse, UserNodeResponse,
};
