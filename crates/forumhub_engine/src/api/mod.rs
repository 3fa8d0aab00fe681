/* 📖 # Why an API module in forumhub_engine?

The api module turns HTTP requests into calls on TopicService and maps the outcome
back onto status codes. It implements the HttpService trait from forumhub_base, so
the same routing runs behind the tiny_http server and behind MockPal in tests.
*/

mod topics;

pub use topics::TopicApi;
