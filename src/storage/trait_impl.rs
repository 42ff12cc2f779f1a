//! Trait implementations for the repositories.

#![allow(clippy::missing_errors_doc)]

use async_trait::async_trait;

use crate::error::StorageError;
use crate::traits::{ClientDirectory, ImageStorage, MeasurementStore};

use super::client::ClientAggregator;
use super::image::ImageStore;
use super::measurement::MeasurementRepository;
use super::types::{
    ClientInfo, ClientStatistics, ClientView, ImageRecord, MeasurementDocument, MeasurementUpdate,
    Measurements, Metadata,
};

#[async_trait]
impl MeasurementStore for MeasurementRepository {
    async fn create(
        &self,
        client_info: &ClientInfo,
        measurements: &Measurements,
        metadata: Option<Metadata>,
    ) -> Result<String, StorageError> {
        Self::create(self, client_info, measurements, metadata.as_ref()).await
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<MeasurementDocument>, StorageError> {
        Self::get_by_id(self, id).await
    }

    async fn get_by_client_email(
        &self,
        email: &str,
        limit: u32,
    ) -> Result<Vec<MeasurementDocument>, StorageError> {
        Self::get_by_client_email(self, email, limit).await
    }

    async fn update(&self, id: &str, updates: &MeasurementUpdate) -> Result<bool, StorageError> {
        Self::update(self, id, updates).await
    }

    async fn delete(&self, id: &str) -> Result<bool, StorageError> {
        Self::delete(self, id).await
    }

    async fn search(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<MeasurementDocument>, StorageError> {
        Self::search(self, query, limit).await
    }
}

#[async_trait]
impl ClientDirectory for ClientAggregator {
    async fn get_unique_clients(&self, limit: u32) -> Result<Vec<ClientView>, StorageError> {
        Self::get_unique_clients(self, limit).await
    }

    async fn get_statistics(&self) -> Result<ClientStatistics, StorageError> {
        Self::get_statistics(self).await
    }
}

#[async_trait]
impl ImageStorage for ImageStore {
    async fn store(
        &self,
        data: &[u8],
        filename: &str,
        metadata: Option<Metadata>,
    ) -> Result<String, StorageError> {
        Self::store(self, data, filename, metadata.as_ref()).await
    }

    async fn get(&self, file_id: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Self::get(self, file_id).await
    }

    async fn get_info(&self, file_id: &str) -> Result<Option<ImageRecord>, StorageError> {
        Self::get_info(self, file_id).await
    }

    async fn delete(&self, file_id: &str) -> Result<bool, StorageError> {
        Self::delete(self, file_id).await
    }
}
