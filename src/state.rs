//! The single owner of the in-memory body list.
//!
//! The renderer reads it through [`BodyState::bodies`] every frame; the side
//! panel and the session change it only through the mutation methods here.

use crate::bodies::{Body, BodyAttribute};

pub struct BodyState {
    bodies: Vec<Body>,
}

impl BodyState {
    pub fn new(bodies: Vec<Body>) -> Self {
        Self { bodies }
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn body(&self, id: &str) -> Option<&Body> {
        self.bodies.iter().find(|b| b.id == id)
    }

    /// Overwrite one attribute of one body. Returns false for an unknown id.
    pub fn set_attribute(&mut self, id: &str, attribute: BodyAttribute, value: f64) -> bool {
        match self.bodies.iter_mut().find(|b| b.id == id) {
            Some(body) => {
                body.set(attribute, value);
                true
            }
            None => false,
        }
    }

    pub fn replace_all(&mut self, bodies: Vec<Body>) {
        self.bodies = bodies;
    }

    pub fn snapshot(&self) -> Vec<Body> {
        self.bodies.clone()
    }
}
