//! Form input and validation.
//!
//! Validation runs before anything reaches the network: a form either turns
//! into a request payload or into per-field messages shown inline.

use std::collections::BTreeMap;

use email_address::EmailAddress;

use crate::api::{CreatePostData, CreateUserData, Post, UpdatePostData, UpdateUserData, User};

/// Field name to message, for every field that failed validation
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("{}", summary(.0))]
pub struct ValidationErrors(BTreeMap<&'static str, String>);

fn summary(errors: &BTreeMap<&'static str, String>) -> String {
  errors.values().map(String::as_str).collect::<Vec<_>>().join("; ")
}

impl ValidationErrors {
  pub fn get(&self, field: &str) -> Option<&str> {
    self.0.get(field).map(String::as_str)
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  #[cfg(test)]
  pub fn len(&self) -> usize {
    self.0.len()
  }

  /// Keeps the first failure per field
  fn add(&mut self, field: &'static str, message: &str) {
    self.0.entry(field).or_insert_with(|| message.to_string());
  }

  fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
    if self.is_empty() {
      Ok(value)
    } else {
      Err(self)
    }
  }
}

/// Accumulates rules for one form
struct Validator(ValidationErrors);

impl Validator {
  fn new() -> Self {
    Self(ValidationErrors::default())
  }

  fn required(&mut self, field: &'static str, value: &str, message: &str) -> &mut Self {
    if value.is_empty() {
      self.0.add(field, message);
    }
    self
  }

  fn min_chars(&mut self, field: &'static str, value: &str, min: usize, message: &str) -> &mut Self {
    if value.chars().count() < min {
      self.0.add(field, message);
    }
    self
  }

  fn email(&mut self, field: &'static str, value: &str) -> &mut Self {
    if !EmailAddress::is_valid(value) {
      self.0.add(field, "Please enter a valid email address");
    }
    self
  }

  fn finish<T>(&mut self, value: T) -> Result<T, ValidationErrors> {
    std::mem::take(&mut self.0).into_result(value)
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
  pub email: String,
  pub password: String,
}

impl LoginForm {
  pub fn validate(&self) -> Result<(), ValidationErrors> {
    Validator::new()
      .email("email", &self.email)
      .required("password", &self.password, "Password is required")
      .finish(())
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostForm {
  pub title: String,
  pub body: String,
}

impl From<&Post> for PostForm {
  fn from(post: &Post) -> Self {
    Self {
      title: post.title.clone(),
      body: post.body.clone(),
    }
  }
}

impl PostForm {
  fn check(&self) -> Result<(), ValidationErrors> {
    Validator::new()
      .required("title", &self.title, "Title is required")
      .min_chars("title", &self.title, 2, "Title must be at least 2 characters")
      .required("body", &self.body, "Body is required")
      .min_chars("body", &self.body, 3, "Body must be at least 3 characters")
      .finish(())
  }

  /// Payload for a new post authored by `user_id`
  pub fn to_create(&self, user_id: u64) -> Result<CreatePostData, ValidationErrors> {
    self.check()?;
    Ok(CreatePostData {
      user_id,
      title: self.title.clone(),
      body: self.body.clone(),
    })
  }

  pub fn to_update(&self, id: u64) -> Result<UpdatePostData, ValidationErrors> {
    self.check()?;
    Ok(UpdatePostData {
      id,
      user_id: None,
      title: Some(self.title.clone()),
      body: Some(self.body.clone()),
    })
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserForm {
  pub name: String,
  pub username: String,
  pub email: String,
  pub phone: String,
  pub website: String,
}

impl From<&User> for UserForm {
  fn from(user: &User) -> Self {
    Self {
      name: user.name.clone(),
      username: user.username.clone(),
      email: user.email.clone(),
      phone: user.phone.clone(),
      website: user.website.clone(),
    }
  }
}

impl UserForm {
  fn check(&self) -> Result<(), ValidationErrors> {
    Validator::new()
      .required("name", &self.name, "Name is required")
      .min_chars("name", &self.name, 2, "Name must be at least 2 characters")
      .required("username", &self.username, "Username is required")
      .min_chars("username", &self.username, 3, "Username must be at least 3 characters")
      .email("email", &self.email)
      .required("phone", &self.phone, "Phone is required")
      .finish(())
  }

  pub fn to_create(&self) -> Result<CreateUserData, ValidationErrors> {
    self.check()?;
    Ok(CreateUserData {
      name: self.name.clone(),
      username: self.username.clone(),
      email: self.email.clone(),
      phone: self.phone.clone(),
      website: self.website.clone(),
    })
  }

  pub fn to_update(&self, id: u64) -> Result<UpdateUserData, ValidationErrors> {
    self.check()?;
    Ok(UpdateUserData {
      id,
      name: Some(self.name.clone()),
      username: Some(self.username.clone()),
      email: Some(self.email.clone()),
      phone: Some(self.phone.clone()),
      website: Some(self.website.clone()),
    })
  }
}
