//! Use-case container - wires ports into every use case once.
//!
//! Ports are injected explicitly; nothing reaches for global state.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use super::{
    AuthenticateUseCase, ChangePasswordUseCase, CreateBookUseCase, CreateRoleUseCase,
    DeleteBookUseCase, DeleteUserUseCase, GetAllBooksUseCase, GetBookByIdUseCase,
    ListRolesUseCase, LoginUserUseCase, RegisterUserUseCase, UpdateBookUseCase,
    UpdateProfileUseCase,
};
use crate::config::Config;
use crate::infra::{Argon2PasswordService, JwtTokenService, Persistence};
use crate::ports::{PasswordService, TokenService};

/// All use cases, cheap to clone and share across tasks
#[derive(Clone)]
pub struct UseCases {
    create_book: Arc<CreateBookUseCase>,
    update_book: Arc<UpdateBookUseCase>,
    delete_book: Arc<DeleteBookUseCase>,
    get_book: Arc<GetBookByIdUseCase>,
    get_all_books: Arc<GetAllBooksUseCase>,
    register: Arc<RegisterUserUseCase>,
    login: Arc<LoginUserUseCase>,
    authenticate: Arc<AuthenticateUseCase>,
    change_password: Arc<ChangePasswordUseCase>,
    update_profile: Arc<UpdateProfileUseCase>,
    delete_user: Arc<DeleteUserUseCase>,
    create_role: Arc<CreateRoleUseCase>,
    list_roles: Arc<ListRolesUseCase>,
}

impl UseCases {
    /// Create the container from a repository set and the credential ports
    pub fn new(
        persistence: &Persistence,
        tokens: Arc<dyn TokenService>,
        passwords: Arc<dyn PasswordService>,
        issue_token_on_register: bool,
    ) -> Self {
        let books = persistence.books();
        let users = persistence.users();
        let roles = persistence.roles();

        Self {
            create_book: Arc::new(CreateBookUseCase::new(books.clone())),
            update_book: Arc::new(UpdateBookUseCase::new(books.clone())),
            delete_book: Arc::new(DeleteBookUseCase::new(books.clone())),
            get_book: Arc::new(GetBookByIdUseCase::new(books.clone())),
            get_all_books: Arc::new(GetAllBooksUseCase::new(books)),
            register: Arc::new(RegisterUserUseCase::new(
                users.clone(),
                tokens.clone(),
                passwords.clone(),
                issue_token_on_register,
            )),
            login: Arc::new(LoginUserUseCase::new(
                users.clone(),
                tokens.clone(),
                passwords.clone(),
            )),
            authenticate: Arc::new(AuthenticateUseCase::new(users.clone(), tokens)),
            change_password: Arc::new(ChangePasswordUseCase::new(users.clone(), passwords)),
            update_profile: Arc::new(UpdateProfileUseCase::new(users.clone())),
            delete_user: Arc::new(DeleteUserUseCase::new(users)),
            create_role: Arc::new(CreateRoleUseCase::new(roles.clone())),
            list_roles: Arc::new(ListRolesUseCase::new(roles)),
        }
    }

    /// Create the container from a database connection and config
    pub fn from_connection(db: DatabaseConnection, config: &Config) -> Self {
        Self::new(
            &Persistence::new(db),
            Arc::new(JwtTokenService::from_config(config)),
            Arc::new(Argon2PasswordService::new()),
            config.issue_token_on_register,
        )
    }

    pub fn create_book(&self) -> Arc<CreateBookUseCase> {
        self.create_book.clone()
    }

    pub fn update_book(&self) -> Arc<UpdateBookUseCase> {
        self.update_book.clone()
    }

    pub fn delete_book(&self) -> Arc<DeleteBookUseCase> {
        self.delete_book.clone()
    }

    pub fn get_book(&self) -> Arc<GetBookByIdUseCase> {
        self.get_book.clone()
    }

    pub fn get_all_books(&self) -> Arc<GetAllBooksUseCase> {
        self.get_all_books.clone()
    }

    pub fn register(&self) -> Arc<RegisterUserUseCase> {
        self.register.clone()
    }

    pub fn login(&self) -> Arc<LoginUserUseCase> {
        self.login.clone()
    }

    pub fn authenticate(&self) -> Arc<AuthenticateUseCase> {
        self.authenticate.clone()
    }

    pub fn change_password(&self) -> Arc<ChangePasswordUseCase> {
        self.change_password.clone()
    }

    pub fn update_profile(&self) -> Arc<UpdateProfileUseCase> {
        self.update_profile.clone()
    }

    pub fn delete_user(&self) -> Arc<DeleteUserUseCase> {
        self.delete_user.clone()
    }

    pub fn create_role(&self) -> Arc<CreateRoleUseCase> {
        self.create_role.clone()
    }

    pub fn list_roles(&self) -> Arc<ListRolesUseCase> {
        self.list_roles.clone()
    }
}
