//! Packages, purchases and payments.

use chrono::{DateTime, Duration, Utc};

use super::{name_of, patch, patch_opt};
use crate::application::dto::request::{
    CreatePackageRequest, CreatePaymentRequest, UpdatePackageRequest, UpdatePaymentRequest,
};
use crate::application::dto::response::{PackageDto, PaymentDto, PurchaseDto};
use crate::domain::{Package, Payment, PaymentStatus, Purchase, PurchaseStatus, Student};

pub fn package_to_dto(package: &Package) -> PackageDto {
    PackageDto {
        id: package.id.to_string(),
        name: package.name.clone(),
        description: package.description.clone(),
        class_count: package.class_count,
        validity_days: package.validity_days,
        price: package.price,
        is_active: package.is_active,
        created_at: package.created_at,
        updated_at: package.updated_at,
    }
}

pub fn package_from_create(request: CreatePackageRequest, id: i64, now: DateTime<Utc>) -> Package {
    Package {
        id,
        name: request.name,
        description: request.description,
        class_count: request.class_count,
        validity_days: request.validity_days,
        price: request.price,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

pub fn apply_package_update(package: &mut Package, request: UpdatePackageRequest, now: DateTime<Utc>) {
    patch(&mut package.name, request.name);
    patch_opt(&mut package.description, request.description);
    patch(&mut package.class_count, request.class_count);
    patch(&mut package.validity_days, request.validity_days);
    patch(&mut package.price, request.price);
    patch(&mut package.is_active, request.is_active);
    package.updated_at = now;
}

/// The reported status is the effective one at `now`, so an active purchase
/// past its expiration reads as `expired` even before it is persisted as such.
pub fn purchase_to_dto(
    purchase: &Purchase,
    student: Option<&Student>,
    package: Option<&Package>,
    now: DateTime<Utc>,
) -> PurchaseDto {
    PurchaseDto {
        id: purchase.id.to_string(),
        student_id: purchase.student_id.to_string(),
        student_name: name_of(student, Student::full_name),
        package_id: purchase.package_id.to_string(),
        package_name: name_of(package, |p| p.name.clone()),
        purchased_at: purchase.purchased_at,
        expires_at: purchase.expires_at,
        remaining_classes: purchase.remaining_classes,
        status: purchase.effective_status(now),
        created_at: purchase.created_at,
        updated_at: purchase.updated_at,
    }
}

/// Credits and expiration come from the package being bought.
pub fn purchase_from_package(
    student_id: i64,
    package: &Package,
    id: i64,
    now: DateTime<Utc>,
) -> Purchase {
    Purchase {
        id,
        student_id,
        package_id: package.id,
        purchased_at: now,
        expires_at: now + Duration::days(i64::from(package.validity_days)),
        remaining_classes: package.class_count,
        status: PurchaseStatus::Active,
        created_at: now,
        updated_at: now,
    }
}

pub fn payment_to_dto(payment: &Payment) -> PaymentDto {
    PaymentDto {
        id: payment.id.to_string(),
        purchase_id: payment.purchase_id.to_string(),
        amount: payment.amount,
        method: payment.method,
        status: payment.status,
        reference: payment.reference.clone(),
        notes: payment.notes.clone(),
        paid_at: payment.paid_at,
        created_at: payment.created_at,
        updated_at: payment.updated_at,
    }
}

/// New payments start `pending` with no `paid_at`.
pub fn payment_from_create(request: CreatePaymentRequest, id: i64, now: DateTime<Utc>) -> Payment {
    Payment {
        id,
        purchase_id: request.purchase_id,
        amount: request.amount,
        method: request.method,
        status: PaymentStatus::Pending,
        reference: request.reference,
        notes: request.notes,
        paid_at: None,
        created_at: now,
        updated_at: now,
    }
}

/// `paid_at` is stamped the first time the payment becomes `completed`.
pub fn apply_payment_update(payment: &mut Payment, request: UpdatePaymentRequest, now: DateTime<Utc>) {
    patch(&mut payment.status, request.status);
    patch_opt(&mut payment.reference, request.reference);
    patch_opt(&mut payment.notes, request.notes);
    if payment.status == PaymentStatus::Completed && payment.paid_at.is_none() {
        payment.paid_at = Some(now);
    }
    payment.updated_at = now;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PaymentMethod;
    use pretty_assertions::assert_eq;

    fn package() -> Package {
        let now = Utc::now();
        Package {
            id: 50,
            name: "Bono 8 clases".into(),
            description: None,
            class_count: 8,
            validity_days: 30,
            price: 96.0,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_purchase_takes_credits_and_validity_from_package() {
        let now = Utc::now();
        let purchase = purchase_from_package(1, &package(), 2, now);
        assert_eq!(purchase.remaining_classes, 8);
        assert_eq!(purchase.expires_at, now + Duration::days(30));
        assert_eq!(purchase.status, PurchaseStatus::Active);
        assert_eq!(purchase.created_at, purchase.updated_at);
    }

    #[test]
    fn test_purchase_dto_reports_effective_status() {
        let bought = Utc::now() - Duration::days(31);
        let purchase = purchase_from_package(1, &package(), 2, bought);
        let dto = purchase_to_dto(&purchase, None, Some(&package()), Utc::now());
        assert_eq!(dto.status, PurchaseStatus::Expired);
        assert_eq!(dto.package_name, "Bono 8 clases");
        assert_eq!(dto.student_name, "");
    }

    #[test]
    fn test_package_update_keeps_price_when_absent() {
        let mut stored = package();
        let now = Utc::now();
        apply_package_update(
            &mut stored,
            UpdatePackageRequest {
                class_count: Some(10),
                ..Default::default()
            },
            now,
        );
        assert_eq!(stored.class_count, 10);
        assert_eq!(stored.price, 96.0);
        assert_eq!(stored.validity_days, 30);
        assert_eq!(stored.updated_at, now);
    }

    #[test]
    fn test_payment_completion_stamps_paid_at_once() {
        let created = Utc::now() - Duration::minutes(5);
        let mut payment = payment_from_create(
            CreatePaymentRequest {
                purchase_id: 2,
                amount: 96.0,
                method: PaymentMethod::Card,
                reference: None,
                notes: None,
            },
            3,
            created,
        );
        assert_eq!(payment.status, PaymentStatus::Pending);
        assert_eq!(payment.paid_at, None);

        let completed_at = Utc::now();
        apply_payment_update(
            &mut payment,
            UpdatePaymentRequest {
                status: Some(PaymentStatus::Completed),
                ..Default::default()
            },
            completed_at,
        );
        assert_eq!(payment.paid_at, Some(completed_at));

        let later = completed_at + Duration::minutes(1);
        apply_payment_update(
            &mut payment,
            UpdatePaymentRequest {
                notes: Some("recibo enviado".into()),
                ..Default::default()
            },
            later,
        );
        assert_eq!(payment.paid_at, Some(completed_at));
        assert_eq!(payment.status, PaymentStatus::Completed);
        assert_eq!(payment.updated_at, later);
    }
}
