use super::{insert, load, save, Catalog};
use crate::auth::{authorize, ensure_owner, Actor};
use crate::error::Result;
use crate::query::{AdvancedResults, Filter, Populate, QueryParams, ResultEnvelope};
use crate::store::Document;
use crate::types::{Book, BookInput, Publisher, Role};

const BOOK_ROLES: [Role; 2] = [Role::Publisher, Role::Admin];

impl Catalog {
    pub(super) fn book_results(&self) -> AdvancedResults {
        let publisher = Populate::belongs_to("publisher", self.db.publishers.clone())
            .select("name description");
        AdvancedResults::new(self.db.books.clone(), Some(publisher))
    }

    /// All books, each with its publisher's name and description
    pub async fn list_books(&self, params: &QueryParams) -> Result<ResultEnvelope<Document>> {
        self.book_results().execute(params).await
    }

    /// One publisher's books; 404 if the publisher does not exist
    pub async fn list_publisher_books(
        &self,
        publisher_id: &str,
        params: &QueryParams,
    ) -> Result<ResultEnvelope<Document>> {
        let _: Publisher = load(&self.db.publishers, publisher_id).await?;
        self.book_results()
            .execute_scoped(Filter::eq("publisher", publisher_id), params)
            .await
    }

    pub async fn get_book(&self, id: &str) -> Result<Book> {
        load(&self.db.books, id).await
    }

    /// Add a book to a publisher the actor owns
    pub async fn create_book(
        &self,
        actor: &Actor,
        publisher_id: &str,
        input: BookInput,
    ) -> Result<Book> {
        authorize(actor, &BOOK_ROLES)?;
        let publisher: Publisher = load(&self.db.publishers, publisher_id).await?;
        ensure_owner(
            actor,
            &publisher.user,
            &format!("add a book to publisher {}", publisher.id),
        )?;

        let book = Book::new(input, publisher.id, actor.id.clone())?;
        insert(&self.db.books, &book).await?;

        tracing::info!(id = %book.id, publisher = %book.publisher, "Book created");
        Ok(book)
    }

    pub async fn update_book(&self, actor: &Actor, id: &str, input: BookInput) -> Result<Book> {
        authorize(actor, &BOOK_ROLES)?;
        let mut book: Book = load(&self.db.books, id).await?;
        ensure_owner(actor, &book.user, "update this book")?;

        book.apply(input)?;
        save(&self.db.books, id, &book).await?;
        Ok(book)
    }

    pub async fn delete_book(&self, actor: &Actor, id: &str) -> Result<()> {
        authorize(actor, &BOOK_ROLES)?;
        let book: Book = load(&self.db.books, id).await?;
        ensure_owner(actor, &book.user, "delete this book")?;

        self.db.books.delete(id).await?;
        tracing::info!(id = %id, "Book deleted");
        Ok(())
    }
}
