use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use campus_erp_ledger::hostel::{Room, RoomOccupancy, Student};
use campus_erp_ledger::{CampusStore, HostelLedger, RoomId, StudentId};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Deserialize)]
pub struct AllocationRequest {
    #[serde(alias = "studentId")]
    pub student_id: StudentId,
    #[serde(alias = "roomId")]
    pub room_id: RoomId,
}

/// Both sides of the link after the change.
#[derive(Serialize)]
pub struct AllocationResponse {
    pub room: Room,
    pub student: Student,
}

pub async fn rooms<S: CampusStore>(
    State(ledger): State<HostelLedger<S>>,
) -> Result<Json<Vec<RoomOccupancy>>, AppError> {
    Ok(Json(ledger.rooms().await?))
}

pub async fn available_rooms<S: CampusStore>(
    State(ledger): State<HostelLedger<S>>,
) -> Result<Json<Vec<Room>>, AppError> {
    Ok(Json(ledger.available_rooms().await?))
}

pub async fn unallocated_students<S: CampusStore>(
    State(ledger): State<HostelLedger<S>>,
) -> Result<Json<Vec<Student>>, AppError> {
    Ok(Json(ledger.unallocated_students().await?))
}

pub async fn allocate<S: CampusStore>(
    State(ledger): State<HostelLedger<S>>,
    payload: Result<Json<AllocationRequest>, JsonRejection>,
) -> Result<Json<AllocationResponse>, AppError> {
    let Json(request) = payload?;
    let (room, student) = ledger
        .allocate(&request.student_id, &request.room_id)
        .await?;
    Ok(Json(AllocationResponse { room, student }))
}

pub async fn deallocate<S: CampusStore>(
    State(ledger): State<HostelLedger<S>>,
    payload: Result<Json<AllocationRequest>, JsonRejection>,
) -> Result<Json<AllocationResponse>, AppError> {
    let Json(request) = payload?;
    let (room, student) = ledger
        .deallocate(&request.student_id, &request.room_id)
        .await?;
    Ok(Json(AllocationResponse { room, student }))
}

#[cfg(test)]
mod tests {
    use http::{Method, StatusCode};
    use serde_json::json;

    use crate::routes::testing::{app, send};

    #[tokio::test]
    async fn allocates_into_free_room() {
        let (_, app) = app();

        let (status, body) = send(
            &app,
            Method::POST,
            "/hostel/allocations",
            Some(json!({ "student_id": "S006", "room_id": "R003" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["room"]["occupants"], json!(["S006"]));
        assert_eq!(body["student"]["allocatedRoomId"], "R003");

        let (_, available) = send(&app, Method::GET, "/hostel/rooms/available", None).await;
        let ids: Vec<_> = available
            .as_array()
            .unwrap()
            .iter()
            .map(|room| room["id"].as_str().unwrap().to_owned())
            .collect();
        assert_eq!(ids, ["R001", "R004", "R005"]);
    }

    #[tokio::test]
    async fn full_room_is_a_conflict() {
        let (_, app) = app();

        let (status, body) = send(
            &app,
            Method::POST,
            "/hostel/allocations",
            Some(json!({ "studentId": "S006", "roomId": "R002" })),
        )
        .await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].as_str().unwrap().contains("full"));
    }

    #[tokio::test]
    async fn unknown_student_is_not_found() {
        let (_, app) = app();

        let (status, _) = send(
            &app,
            Method::POST,
            "/hostel/allocations",
            Some(json!({ "student_id": "S404", "room_id": "R003" })),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn deallocation_frees_the_bed() {
        let (_, app) = app();

        let (status, body) = send(
            &app,
            Method::POST,
            "/hostel/deallocations",
            Some(json!({ "student_id": "S001", "room_id": "R001" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["student"]["allocatedRoomId"], json!(null));

        let (_, unallocated) =
            send(&app, Method::GET, "/hostel/students/unallocated", None).await;
        assert_eq!(unallocated.as_array().unwrap().len(), 3);

        let (status, _) = send(
            &app,
            Method::POST,
            "/hostel/deallocations",
            Some(json!({ "student_id": "S001", "room_id": "R001" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn rooms_list_occupant_names() {
        let (_, app) = app();

        let (status, rooms) = send(&app, Method::GET, "/hostel/rooms", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(rooms[1]["occupants"][1]["name"], "Charlie Brown");
    }

    #[tokio::test]
    async fn malformed_body_is_rejected() {
        let (_, app) = app();

        let (status, body) = send(
            &app,
            Method::POST,
            "/hostel/allocations",
            Some(json!({ "student_id": "S006" })),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn storage_outage_is_unavailable() {
        let (store, app) = app();
        store.set_offline(true);

        let (status, _) = send(&app, Method::GET, "/hostel/rooms", None).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
