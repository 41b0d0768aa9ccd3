mod listing;
mod paging;
mod query;
